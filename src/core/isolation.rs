//! Panic isolation around appender calls

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run `f`, turning a panic into its message.
///
/// `AssertUnwindSafe` is used: an appender that panics while holding its
/// own lock may leave that state inconsistent, but never the logger's.
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_panic_ok() {
        assert_eq!(catch_panic(|| 7), Ok(7));
    }

    #[test]
    fn test_catch_panic_messages() {
        assert_eq!(catch_panic(|| panic!("static")), Err::<(), _>("static".to_string()));
        assert_eq!(
            catch_panic(|| panic!("formatted {}", 42)),
            Err::<(), _>("formatted 42".to_string())
        );
        assert_eq!(
            catch_panic(|| std::panic::panic_any(5u8)),
            Err::<(), _>("Unknown panic".to_string())
        );
    }
}

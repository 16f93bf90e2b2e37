use crate::CancelSignal;

/// Extension for results observed by whoever owns the cancellation signal.
pub trait ResultExt: Sized {
    type Ok;
    type Err;

    /// Passes `Ok` through untouched. On `Err`, cancels `signal` and hands the
    /// error back so the caller can record it.
    ///
    /// ```rust
    /// use failfast::prelude::*;
    /// use failfast::{CancelSignal, UnitFailure};
    ///
    /// let signal = CancelSignal::new();
    /// assert_eq!(Ok::<_, UnitFailure>(3).or_cancel(&signal), Ok(3));
    /// assert!(!signal.is_cancelled());
    ///
    /// let err = Err::<i64, _>(UnitFailure::at(1)).or_cancel(&signal);
    /// assert_eq!(err, Err(UnitFailure::at(1)));
    /// assert!(signal.is_cancelled());
    /// ```
    fn or_cancel(self, signal: &CancelSignal) -> Result<Self::Ok, Self::Err>;
}

impl<O, E> ResultExt for Result<O, E> {
    type Ok = O;
    type Err = E;

    fn or_cancel(self, signal: &CancelSignal) -> Result<O, E> {
        if self.is_err() {
            signal.cancel();
        }
        self
    }
}

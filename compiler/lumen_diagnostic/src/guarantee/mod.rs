use std::fmt;

/// Proof that at least one error diagnostic was reported.
///
/// Cannot be constructed outside this crate except through
/// [`ErrorGuaranteed::from_error_count`]; the usual source is
/// [`DiagnosticSink::add_error`](crate::DiagnosticSink::add_error).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed {
    _private: (),
}

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed { _private: () }
    }

    /// Recover a guarantee from an error count, if any errors were reported.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

#[cfg(test)]
mod tests;

use std::fmt;

/// Error codes for all resolver diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: Name resolution and dependency ordering
/// - E2xxx: Semantic errors (types, declarations, validation)
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Name Resolution (E1xxx)
    /// Unknown identifier, function or type
    E1001,
    /// Redeclaration of a module-scope symbol
    E1002,
    /// Cyclic dependency between module-scope declarations
    E1003,

    // Semantic Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Invalid or malformed type
    E2002,
    /// Feature used without its extension enabled
    E2003,
    /// Invalid declaration
    E2004,
    /// Invalid attribute
    E2005,
    /// Expression is not a constant expression
    E2006,
    /// Invalid member or index access
    E2007,
    /// No matching overload for a builtin, constructor or operator
    E2008,
    /// Invalid call
    E2009,
    /// Size or count exceeds an implementation limit
    E2010,
    /// Invalid memory layout
    E2011,
    /// Storage class misuse
    E2012,
    /// Redefinition of a parameter or member
    E2013,
    /// Invalid control flow
    E2014,
    /// Static assertion failed
    E2015,
    /// Invalid or duplicate override id
    E2016,
    /// Invalid entry point
    E2017,
    /// Constant evaluation failure
    E2018,
    /// Uniformity violation
    E2019,
    /// Use of a deprecated feature (warning)
    E2020,
    /// Expression nesting too deep
    E2021,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Check if this is a name-resolution error (E1xxx range).
    pub fn is_name_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal(&self) -> bool {
        self.as_str().starts_with("E9")
    }

    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Names
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            // Semantic
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E2021 => "E2021",
            // Internal
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Codes that are reported as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::E2020)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;

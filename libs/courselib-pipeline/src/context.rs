//! Request-scoped inputs to problem translation.

/// Where a failed validation state came from.
///
/// Callers say explicitly which phase produced the failure; the translator
/// never has to inspect the surrounding framework context to find out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingContext {
    /// Raised while the framework was binding action arguments.
    BindingTime {
        /// Arguments that were present and parseable.
        bound_arguments: usize,
        /// Parameters the action declares.
        declared_parameters: usize,
    },
    /// Raised by an explicit validation pass over an already constructed
    /// object, inside the handler. Every input was parsed by then.
    PostConstruction,
}

impl BindingContext {
    /// True when every input was structurally present and parseable, so any
    /// recorded error must be a business-rule failure.
    ///
    /// An argument bound to its default (absent optional) counts as bound.
    #[must_use]
    pub fn all_arguments_bound(self) -> bool {
        match self {
            Self::PostConstruction => true,
            Self::BindingTime {
                bound_arguments,
                declared_parameters,
            } => bound_arguments == declared_parameters,
        }
    }
}

/// Borrowed view handed to the translator.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub trace_id: Option<&'a str>,
    pub binding: BindingContext,
}

impl<'a> RequestContext<'a> {
    #[must_use]
    pub fn new(path: &'a str, binding: BindingContext) -> Self {
        Self {
            path,
            trace_id: None,
            binding,
        }
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: Option<&'a str>) -> Self {
        self.trace_id = trace_id;
        self
    }
}

/// Owned request facts captured once by the extractors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScope {
    pub path: String,
    pub trace_id: Option<String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
}

impl RequestScope {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn context(&self, binding: BindingContext) -> RequestContext<'_> {
        RequestContext::new(&self.path, binding).with_trace_id(self.trace_id.as_deref())
    }
}

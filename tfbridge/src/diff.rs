//! Diff suppression for optional configuration blocks
//!
//! A DiffSuppress implementation lets a schema declare that a particular
//! prior/planned difference is not a real change. The host owns diff
//! computation; these hooks are metadata it consults per attribute.

use crate::types::{Dynamic, DynamicValue};

/// Request passed to diff suppressors
pub struct DiffSuppressRequest {
    /// Value recorded in state
    pub prior: Dynamic,
    /// Value proposed by configuration
    pub planned: Dynamic,
    /// Full current state, for suppressors that depend on other attributes
    pub state: DynamicValue,
}

/// Decides whether a prior/planned difference should be ignored
pub trait DiffSuppress: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Return true to suppress the difference
    fn suppress(&self, request: DiffSuppressRequest) -> bool;
}

/// Suppresses the diff produced when a server reports an optional
/// configuration block that the user never wrote: one block in state,
/// none in configuration.
pub struct SuppressMissingBlock;

impl SuppressMissingBlock {
    pub fn create() -> Box<dyn DiffSuppress> {
        Box::new(Self)
    }
}

impl DiffSuppress for SuppressMissingBlock {
    fn description(&self) -> String {
        "suppress removal of an optional configuration block the server populated".to_string()
    }

    fn suppress(&self, request: DiffSuppressRequest) -> bool {
        let prior_len = match &request.prior {
            Dynamic::List(l) => l.len(),
            _ => 0,
        };
        let planned_len = match &request.planned {
            Dynamic::List(l) => l.len(),
            _ => 0,
        };
        prior_len == 1 && planned_len == 0
    }
}

/// Suppresses the diff whenever the predicate holds
pub struct SuppressIf<F>
where
    F: Fn(&DiffSuppressRequest) -> bool + Send + Sync,
{
    predicate: F,
    description: String,
}

impl<F> SuppressIf<F>
where
    F: Fn(&DiffSuppressRequest) -> bool + Send + Sync + 'static,
{
    pub fn create(predicate: F, description: impl Into<String>) -> Box<dyn DiffSuppress> {
        Box::new(Self {
            predicate,
            description: description.into(),
        })
    }
}

impl<F> DiffSuppress for SuppressIf<F>
where
    F: Fn(&DiffSuppressRequest) -> bool + Send + Sync,
{
    fn description(&self) -> String {
        self.description.clone()
    }

    fn suppress(&self, request: DiffSuppressRequest) -> bool {
        (self.predicate)(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    #[test]
    fn missing_block_suppresses_one_to_zero() {
        let suppress = SuppressMissingBlock;
        assert!(suppress.suppress(DiffSuppressRequest {
            prior: Dynamic::List(vec![Dynamic::Bool(true)]),
            planned: Dynamic::List(vec![]),
            state: DynamicValue::empty_object(),
        }));
    }

    #[test]
    fn missing_block_keeps_real_changes() {
        let suppress = SuppressMissingBlock;
        assert!(!suppress.suppress(DiffSuppressRequest {
            prior: Dynamic::List(vec![Dynamic::Bool(true)]),
            planned: Dynamic::List(vec![Dynamic::Bool(false)]),
            state: DynamicValue::empty_object(),
        }));
        assert!(!suppress.suppress(DiffSuppressRequest {
            prior: Dynamic::Null,
            planned: Dynamic::List(vec![Dynamic::Bool(true)]),
            state: DynamicValue::empty_object(),
        }));
    }

    #[test]
    fn suppress_if_consults_state() {
        let suppress = SuppressIf::create(
            |req| {
                req.state
                    .get_string(&AttributePath::new("id"))
                    .map(|id| !id.is_empty())
                    .unwrap_or(false)
            },
            "suppress once the record has an identity",
        );

        let mut state = DynamicValue::empty_object();
        state
            .set_string(&AttributePath::new("id"), "svc-a".to_string())
            .unwrap();

        assert!(suppress.suppress(DiffSuppressRequest {
            prior: Dynamic::Bool(false),
            planned: Dynamic::Bool(true),
            state,
        }));
        assert!(!suppress.suppress(DiffSuppressRequest {
            prior: Dynamic::Bool(false),
            planned: Dynamic::Bool(true),
            state: DynamicValue::empty_object(),
        }));
    }
}

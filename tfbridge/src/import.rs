//! Import helpers for simplifying resource import implementations

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID to a specific attribute in state
///
/// Useful for resources where the import ID maps directly to a single
/// attribute: ID "svc-a" -> state.id = "svc-a". The host's follow-up read
/// pass fills in the remaining attributes.
pub fn import_state_passthrough_id(
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let mut state = DynamicValue::empty_object();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                "Failed to set import ID",
                format!(
                    "Could not set attribute '{:?}' to value '{}': {}",
                    attr_path, request.id, e
                ),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
    });
}

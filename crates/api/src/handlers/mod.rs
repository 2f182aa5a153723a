pub mod auth;
pub mod users;

use tessera_core::error::CoreError;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// Run `validator` rules on a request body and turn failures into a 400.
///
/// Field messages are sorted by field name so the response is deterministic.
pub(crate) fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|errors| AppError::Core(CoreError::Validation(validation_message(&errors))))
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

use serde_json::Value;

use crate::spec::survey::SurveySpec;

/// JSON schema describing survey definitions accepted by the engine.
pub fn survey_schema() -> Value {
    schemars::schema_for!(SurveySpec).to_value()
}

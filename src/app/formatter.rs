use serde::Serialize;

pub struct OutputGenerator;

impl OutputGenerator {
    /// Serializes `value` as a single line of JSON, or indented when `pretty`.
    pub fn generate_json<T: Serialize + ?Sized>(
        value: &T,
        pretty: bool,
    ) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

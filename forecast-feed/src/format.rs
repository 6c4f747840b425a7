use crate::{OutputRecord, Result, DATE_FORMAT};

/// Header of the external forecast feed. Asterisks mark fields the
/// downstream system requires to be non-empty.
pub const HEADER: &str = "date *\ttime *\ttimezone *\tvalue *\texternalForecastVariableId *\texternalForecastConfigurationId\tUnit integration key\tSection integration key";

/// The forecast configuration is not provided by the export.
const CONFIGURATION_ID: &str = "";
const UNIT_INTEGRATION_KEY: &str = "produktion";
const SECTION_INTEGRATION_KEY: &str = "köket";

/// Renders the sorted records as tab-separated text, one header line
/// followed by one line per record, joined with `\n`.
pub fn render(records: &[OutputRecord]) -> Result<String> {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.to_string());

    for record in records {
        let date = record.date.format(DATE_FORMAT)?;
        lines.push(format!(
            "{date}\t{time}\t{timezone}\t{value}\t{variable_id}\t{CONFIGURATION_ID}\t{UNIT_INTEGRATION_KEY}\t{SECTION_INTEGRATION_KEY}",
            time = record.time,
            timezone = record.timezone,
            value = record.value,
            variable_id = record.variable_id,
        ));
    }

    Ok(lines.join("\n"))
}

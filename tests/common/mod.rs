/// Shared test fixtures and utilities for test modules
#[allow(dead_code)]
pub mod fixtures {
    use showup_sender::configuration::{Credential, ProviderSettings};
    use showup_sender::template::TemplateParameters;

    pub const SENDER_PHONE_ID: &str = "488500504337884";
    pub const RECIPIENT: &str = "972525401686";
    pub const TOKEN: &str = "test-access-token";

    /// The wedding invitation used as the reference example
    pub fn wedding_parameters() -> TemplateParameters {
        TemplateParameters::new()
            .with("date", "5 בנובמבר 2024")
            .with("time", "19:30")
            .with("location", "גן האירועים")
            .with("hosts", "עומר ושני")
    }

    /// Provider settings pointing at a mock server
    pub fn provider_settings(api_base: &str) -> ProviderSettings {
        let mut settings = ProviderSettings::new(Credential::new(TOKEN).unwrap());
        settings.api_base = api_base.to_string();
        settings.phone_number_id = Some(SENDER_PHONE_ID.to_string());
        settings
    }
}

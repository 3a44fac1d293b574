//! Process configuration, read once at startup from the environment
//! (with `.env` loaded by the caller).

use crate::mailer::SendGridConfig;
use crate::render_api::RenderApiConfig;
use crate::storage::SupabaseConfig;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase: SupabaseConfig,
    /// Anon key for the PostgREST catalog tables. Optional: the storage
    /// bucket is public and works without it.
    pub supabase_anon_key: Option<String>,
    pub render_api: RenderApiConfig,
    pub sendgrid: SendGridConfig,
    /// TTF for slide titles and watermarks.
    pub font_path: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let supabase = SupabaseConfig::from_env().map_err(anyhow::Error::msg)?;
        let supabase_anon_key = std::env::var("SUPABASE_ANON_KEY").ok();
        let render_api = RenderApiConfig::from_env();
        let sendgrid = SendGridConfig::from_env()
            .context("SENDGRID_API_KEY and SENDGRID_FROM must be set")?;
        let font_path = std::env::var("FONT_PATH")
            .unwrap_or_else(|_| "assets/fonts/DejaVuSans.ttf".to_string());
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            supabase,
            supabase_anon_key,
            render_api,
            sendgrid,
            font_path,
            bind_addr,
        })
    }
}

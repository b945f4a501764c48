use clap::Args;

use crate::config::Context;
use crate::navigation::{Navigator, HOME_PATH};
use crate::Result;

/// Get a resource, e.g. `/items/` or `/categories/`
#[derive(Args, Debug)]
pub struct GetCommand {
    /// Resource path relative to the api base url
    #[arg(index = 1, value_name = "PATH")]
    path: String,
    /// Page the request is issued from
    #[arg(long, default_value = HOME_PATH)]
    page: String,
}

impl GetCommand {
    pub async fn run(self, context: Context) -> Result<()> {
        context.location.navigate(&self.page);

        let value: serde_json::Value = context.gateway.get(&self.path).await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

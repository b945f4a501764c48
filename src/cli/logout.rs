use clap::Args;

use crate::config::Context;
use crate::Result;

/// Sign out and forget the persisted token
#[derive(Args, Debug)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn run(self, context: Context) -> Result<()> {
        context.session.logout().await;
        println!("OK");
        Ok(())
    }
}

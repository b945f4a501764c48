use clap::Args;

use crate::config::Context;
use crate::{InvctlError, Result};

/// Show the user of the persisted session
#[derive(Args, Debug)]
pub struct WhoamiCommand {
    /// Fetch the profile again instead of using the one resolved at startup
    #[arg(long)]
    refresh: bool,
}

impl WhoamiCommand {
    pub async fn run(self, context: Context) -> Result<()> {
        let user = if self.refresh {
            context.session.refresh().await?
        } else {
            context.session.user()
        };

        let user = match user {
            Some(user) => user,
            None => {
                if let Some(reason) = context.session.snapshot().failure() {
                    eprintln!("session dropped: {}", reason);
                }
                return Err(InvctlError::Unauthenticated);
            }
        };

        println!("{} (id {})", user.username, user.id);
        if let Some(full_name) = &user.full_name {
            println!("  name:   {}", full_name);
        }
        if let Some(email) = &user.email {
            println!("  email:  {}", email);
        }
        println!("  role:   {}", user.role);
        println!("  active: {}", user.is_active);
        println!(
            "  can edit inventory: {}, can manage users: {}",
            user.can_edit_inventory(),
            user.can_manage_users()
        );
        Ok(())
    }
}

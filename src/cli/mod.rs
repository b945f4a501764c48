mod root;
pub use root::{initialize, parse, ClientOptions, Command, InvctlCommand};

pub mod get;
pub mod login;
pub mod logout;
pub mod whoami;

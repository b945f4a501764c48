mod credential;
pub use self::credential::{Credential, Password};

mod principal;
pub use self::principal::{Principal, Role, UserProfile};

mod state;
pub use self::state::{Epoch, Phase, Session, SessionState};

mod store;
pub use self::store::SessionStore;

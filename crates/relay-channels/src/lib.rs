pub mod channel;
pub mod error;
pub mod types;

pub use channel::{Bridge, FileProcessor, PlatformHandler};
pub use error::ChannelError;
pub use types::{LocalEvent, MemberInfo, SayOptions};

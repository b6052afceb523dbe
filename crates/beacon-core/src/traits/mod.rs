mod clock;
mod scrubber;
mod storage;
mod transport;

pub use clock::{IClock, SystemClock};
pub use scrubber::IScrubber;
pub use storage::IKeyValueStore;
pub use transport::{ITransport, SendOutcome};

//! Signed query API: signing, dispatch, XML decoding and response interpretation.

pub mod client;
pub mod error;
pub mod normalize;
pub mod protocol;
pub mod regions;
pub mod response;
pub mod signer;
pub mod transport;
pub mod tree;

pub use client::{ClientSettings, QueryClient};
pub use error::{ApiError, Result};
pub use normalize::normalize;
pub use protocol::{Clock, FixedClock, ProtocolConfig, SystemClock};
pub use regions::{CloudClient, Region, RegionHandle};
pub use response::{interpret, VendorError};
pub use signer::{Credentials, Signer};
pub use transport::{HttpResponse, HttpTransport, Transport};
pub use tree::{DecodeError, ResponseTree};

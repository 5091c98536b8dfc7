pub mod error;
pub mod event;
pub mod history;
pub mod reading;

pub use error::{PowerError, Result};
pub use event::Message;
pub use history::{History, Trend, TREND_THRESHOLD_WATTS};
pub use reading::Reading;

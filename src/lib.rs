// SPDX-License-Identifier: MPL-2.0
//! `notiq` is a scheduling engine for short-lived display notices.
//!
//! It admits notices from any number of concurrent producers into a
//! capacity-bounded display surface, ordered by arrival, no faster than one
//! per configured gap, and retires them head-first once their lifetime has
//! elapsed. Notices can also be reserved against an external monotonic
//! counter and are displayed once the counter reaches their threshold,
//! unless cancelled first.
//!
//! Rendering, localization, and audio are collaborator concerns behind the
//! [`Dispatcher`] trait; the engine itself performs no I/O.
//!
//! ```no_run
//! use std::sync::Arc;
//! use notiq::{Category, Config, CorrelationKey, NoopDispatcher, NoticeEngine};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> notiq::Result<()> {
//! let engine = NoticeEngine::new(Config::default(), Arc::new(NoopDispatcher))?;
//! let handle = engine.handle();
//!
//! handle.push(Category::Success, "Item crafted");
//!
//! let key = CorrelationKey::new();
//! handle.reserve(Category::Info, "Craft finished", 1_200, key);
//! handle.on_counter_advanced(1_200);
//!
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod notice;

pub use config::{Config, OverflowPolicy};
pub use dispatcher::{Dispatcher, NoopDispatcher};
pub use engine::{CorrelationKey, NoticeEngine, NoticeHandle};
pub use error::{Error, Result};
pub use notice::{Category, Notice, NoticeId};

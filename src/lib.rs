//! swstack - install/rollback history for swinstalled files
//!
//! Every file installed through swinstall keeps a stack document next to it
//! recording which version was installed when, and which one is current.
//! This crate reads and writes those documents.
//!
//! # Quick Start
//!
//! ```ignore
//! use swstack::{InstallRequest, StackConfig, StackManager, Timestamp};
//!
//! let manager = StackManager::new(&StackConfig::default())?;
//! let mut stack = manager.resolve("/opt/tools/packages.xml".as_ref())?;
//!
//! stack.insert(InstallRequest::with_hash("5f2b..."))?;
//! let then = stack.file_on(Timestamp::parse("20181105-103813")?)?;
//! println!("{}", then.path().display());
//! ```
//!
//! # Architecture
//!
//! - `swstack-core`: timestamps, version keys, metadata, paths, errors
//! - `swstack-durability`: XML codec and the save-time modification guard
//! - `swstack-engine`: schema engines, registry and [`StackManager`]

pub use swstack_core::*;
pub use swstack_durability::{PersistenceGuard, StackDocument, WriteOptions};
pub use swstack_engine::{
    SchemaRegistry, Schema1Stack, Schema2Stack, StackConfig, StackManager, StackSchema,
    CONFIG_FILE_NAME,
};

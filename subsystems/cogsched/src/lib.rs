//! # Helix Cognitive Attention Scheduler
//!
//! An auxiliary process selector that runs next to the host scheduler. It
//! ranks runnable processes by an *attention* score computed from eight
//! weighted behavioural features and dispatches them through a small set of
//! priority buckets instead of one ordered run queue.
//!
//! The host keeps ownership of process lifecycle, context switching, timers
//! and CPU assignment. It marks processes cognitive, and calls in at three
//! points: when a process becomes runnable, when it wants the next process,
//! and periodically to refresh features.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                         ATTENTION ALLOCATOR                            │
//! │                                                                        │
//! │   ┌──────────────┐    ┌──────────────┐    ┌────────────────────────┐   │
//! │   │ FeatureVector│───▶│   SCORING    │───▶│   BUCKETS (L levels)   │   │
//! │   │  (per proc)  │    │ Σ f·w × 1.2? │    │                        │   │
//! │   └──────▲───────┘    └──────────────┘    │  ≥1.00  [P4]           │   │
//! │          │                                │  ≥0.75  [P9][P2]       │   │
//! │          │ refresh                        │  ≥0.50  (empty)        │   │
//! │          │                                │  rest   [P1][P7][P3]   │   │
//! │   ┌──────┴───────┐                        └───────────┬────────────┘   │
//! │   │   TENSOR     │                                    │ select_next    │
//! │   │ ring of ticks│                                    ▼                │
//! │   └──────────────┘                         first non-empty, FIFO       │
//! │                                                                        │
//! │   budget (advisory)      emergency flag (host bypass hint)            │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use helix_cogsched::{AttentionAllocator, CogProc, Feature, ManualClock};
//!
//! let sched = AttentionAllocator::with_clock(ManualClock::new(100));
//! let proc = Arc::new(CogProc::cognitive(7));
//!
//! sched.set_feature(&proc, Feature::Interactive.index(), 1.0);
//! sched.ready(&proc);
//!
//! let next = sched.select_next().unwrap();
//! assert_eq!(next.pid(), 7);
//! ```
//!
//! ## Error Policy
//!
//! Scheduling calls never fail. Non-cognitive processes are ignored,
//! out-of-range feature indices read as zero and are dropped on write, and
//! bucket contention is reported through [`RemoveOutcome`]. Only
//! construction with an invalid [`CogConfig`] returns an error.
//!
//! Low buckets can starve under sustained high-attention load; there is no
//! aging.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod allocator;
pub mod clock;
pub mod config;
pub mod debug;
pub mod error;
pub mod feature;
pub mod process;
pub mod queue;
pub mod score;
pub mod tensor;

pub use allocator::{AllocatorStats, AttentionAllocator};
pub use clock::{ManualClock, Tick, TickSource};
pub use config::CogConfig;
pub use error::{CogError, CogResult, ErrorKind};
pub use feature::{Feature, FeatureVector, FEATURE_COUNT};
pub use process::{CogProc, Pid, ProcFlags};
pub use queue::{AttentionQueue, RemoveOutcome};
pub use score::{compute_attention, ATTENTION_WEIGHTS};
pub use tensor::AttentionTensor;

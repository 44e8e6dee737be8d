//! This crate exposes the internal functionality of the originscan
//! origin-server finder.
//!
//! originscan takes the universities of a region, sends each one's first
//! domain a `HEAD` request, and keeps the hosts whose `Server` header does not
//! point at a content-delivery network. The survivors are ranked by latency,
//! giving a list of nearby web servers that answer directly.
//!
//! ## Architecture Overview
//!
//! The core scanning behaviour is managed by
//! [`Scanner`](crate::scanner::Scanner), which in turn requires a
//! [`Probe`](crate::scanner::Probe). A run goes through these steps:
//!
//! 1. **Precheck**: [`network`] confirms an IPv4 route exists
//! 2. **Location**: [`location`] asks trace endpoints for the caller's region
//! 3. **Candidates**: [`candidates`] loads the dataset and keeps that region
//! 4. **Probing**: [`scanner`] fans out at most
//!    [`MAX_CONCURRENCY`](crate::scanner::MAX_CONCURRENCY) probes at a time
//! 5. **Classification**: [`classifier`] drops CDN-fronted hosts
//! 6. **Ranking**: [`results`] sorts the hits by latency and truncates
//!
//! ## Basic Usage Example
//!
//! ```rust,no_run
//! use originscan::candidates::Candidate;
//! use originscan::scanner::{HttpProber, Scanner, MAX_CONCURRENCY};
//!
//! #[tokio::main]
//! async fn main() {
//!     let candidates = vec![Candidate {
//!         name: "Example University".to_owned(),
//!         domains: vec!["example.edu".to_owned()],
//!     }];
//!
//!     let scanner = Scanner::new(HttpProber::new(), MAX_CONCURRENCY, 10);
//!     let report = scanner.run(&candidates).await;
//!
//!     for record in &report.records {
//!         println!("{} {:?} {}", record.domain, record.latency, record.server);
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Only startup problems are fatal: a missing IPv4 stack or an unusable
//! dataset. Unreachable hosts, edge-fronted hosts and failed location probes
//! are absorbed and only show up as a shorter result list.
#![allow(clippy::needless_doctest_main)]
#![warn(missing_docs)]

pub mod tui;

pub mod input;

pub mod network;

pub mod location;

pub mod candidates;

pub mod classifier;

pub mod scanner;

pub mod results;

pub mod output;

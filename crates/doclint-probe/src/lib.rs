//! doclint-probe: black-box checks against the services the DSP runbook
//! documents.
//!
//! Probes never fail the process. Each one yields a [`ProbeResult`], and a
//! [`ProbeSuite`] runs them concurrently into a [`ProbeReport`].

pub mod client_config;
pub mod command;
pub mod config;
pub mod error;
pub mod http;
pub mod probe;
pub mod suite;

pub use client_config::ClientConfigProbe;
pub use command::{run_command, CommandOutput, ComposeConfigProbe, ContainerProbe};
pub use config::{join_url, ProbeConfig};
pub use error::{ProbeError, Result};
pub use http::{build_client, check_search_payload, HttpProbe, SearchProbe};
pub use probe::{Probe, ProbeResult};
pub use suite::{ProbeReport, ProbeSuite};

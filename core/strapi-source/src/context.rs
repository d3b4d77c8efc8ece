use strapi_client::{Reporter, StrapiClient, StrapiConfig};

use crate::cache::Cache;
use crate::graph::ContentGraph;

/// Collaborators shared by every step of a sourcing run.
#[derive(Clone, Copy)]
pub struct SourceContext<'a> {
    pub client: &'a StrapiClient,
    pub cache: &'a dyn Cache,
    pub graph: &'a dyn ContentGraph,
    pub reporter: &'a dyn Reporter,
}

impl<'a> SourceContext<'a> {
    pub fn new(
        client: &'a StrapiClient,
        cache: &'a dyn Cache,
        graph: &'a dyn ContentGraph,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            client,
            cache,
            graph,
            reporter,
        }
    }

    pub fn config(&self) -> &'a StrapiConfig {
        self.client.config()
    }
}

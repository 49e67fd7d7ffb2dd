//! Read-only data sources

mod uplink;

pub use uplink::{UplinkDataModel, UplinkDataSource};

use crate::resource::{DataSource, DataSourceAdapter, DataSourceHandle};
use crate::schema::Schema;
use instellar_client::Client;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Uplink,
}

impl DataSourceKind {
    pub const ALL: [DataSourceKind; 1] = [DataSourceKind::Uplink];

    pub fn type_name(&self) -> &'static str {
        match self {
            DataSourceKind::Uplink => "instellar_uplink",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    pub fn schema(&self) -> Schema {
        match self {
            DataSourceKind::Uplink => UplinkDataSource::schema(),
        }
    }

    pub fn build(&self, client: Arc<Client>) -> Box<dyn DataSourceHandle> {
        match self {
            DataSourceKind::Uplink => Box::new(DataSourceAdapter::new(
                self.type_name(),
                UplinkDataSource::new(client),
            )),
        }
    }
}

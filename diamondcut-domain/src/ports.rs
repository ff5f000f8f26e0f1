use diamondcut_types::routing::RoutingSnapshot;
use diamondcut_types::{Address, Selector};

/// Read-only view of a diamond's routing table, as exposed by its loupe.
///
/// The planner only reads through this trait, so it can run against a live
/// node adapter or an in-memory snapshot.
pub trait RoutingTable {
    /// Selectors currently routed to `facet`. The null address has none.
    fn facet_function_selectors(&self, facet: Address) -> anyhow::Result<Vec<Selector>>;

    /// Every facet address with at least one routed selector.
    fn facet_addresses(&self) -> anyhow::Result<Vec<Address>>;
}

impl RoutingTable for RoutingSnapshot {
    fn facet_function_selectors(&self, facet: Address) -> anyhow::Result<Vec<Selector>> {
        Ok(self.selectors_for(facet))
    }

    fn facet_addresses(&self) -> anyhow::Result<Vec<Address>> {
        Ok(self.addresses())
    }
}

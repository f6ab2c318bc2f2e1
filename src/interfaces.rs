use std::collections::HashMap;

/// Opaque identifier of a transmittable interface, as handed to the link
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceHandle(pub u32);

/// Resolves logical link names ("wlan0", "a2g0") to interface handles. The
/// scenario wires one selector per node.
#[derive(Debug, Clone, Default)]
pub struct InterfaceSelector {
    interfaces: HashMap<String, InterfaceHandle>,
}

impl InterfaceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, id: u32) {
        self.interfaces.insert(name.to_string(), InterfaceHandle(id));
    }

    pub fn egress_id(&self, name: &str) -> Option<InterfaceHandle> {
        self.interfaces.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_logical_name() {
        let mut selector = InterfaceSelector::new();
        selector.add("wlan0", 1);
        selector.add("a2g0", 2);

        assert_eq!(selector.egress_id("wlan0"), Some(InterfaceHandle(1)));
        assert_eq!(selector.egress_id("a2g0"), Some(InterfaceHandle(2)));
        assert_eq!(selector.egress_id("eth3"), None);
    }
}

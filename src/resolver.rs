//! Schema resolution - eliminates `$ref` and composition keywords.
//!
//! Each schema node is resolved on demand into a [`ResolvedProperty`]: one
//! flattened keyword map in which `$ref`, `allOf`, `anyOf` and `oneOf` no
//! longer appear. Nested property schemas are left raw; the extractor
//! resolves them when it reaches them.

use serde_json::{Map, Value};

use crate::loader::{is_local_ref, navigate_fragment};
use crate::schema::{required_names, SchemaNode};
use crate::types::{Degradation, DegradationKind, InterpretOptions, COMPOSITION_KEYWORDS};

/// A schema node with every composition keyword merged away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProperty(Map<String, Value>);

impl ResolvedProperty {
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Tagged view of the resolved node.
    pub fn node(&self) -> SchemaNode<'_> {
        SchemaNode::classify(&self.0)
    }

    /// The node's own `properties`, if any.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }
}

impl From<Map<String, Value>> for ResolvedProperty {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Merge two resolved nodes; `overlay` wins on scalar conflicts.
///
/// `properties` are merged per key (same-named property schemas are merged
/// recursively) and `required` arrays are unioned, keeping first occurrence
/// order. Returns a new value; neither input is modified.
pub fn merge(base: &ResolvedProperty, overlay: &ResolvedProperty) -> ResolvedProperty {
    ResolvedProperty(merge_maps(&base.0, &overlay.0))
}

fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();

    for (key, value) in overlay {
        match key.as_str() {
            "properties" => {
                let combined = match (base.get("properties"), value) {
                    (Some(Value::Object(left)), Value::Object(right)) => {
                        Value::Object(merge_properties(left, right))
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            "required" => {
                let mut names = required_names(base);
                for name in required_names(overlay) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
                merged.insert(
                    key.clone(),
                    Value::Array(names.into_iter().map(Value::String).collect()),
                );
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged
}

fn merge_properties(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = base.clone();
    for (name, schema) in overlay {
        let combined = match (base.get(name), schema) {
            (Some(Value::Object(left)), Value::Object(right)) => {
                tracing::trace!(property = %name, "merging same-named property schemas");
                Value::Object(merge_maps(left, right))
            }
            _ => schema.clone(),
        };
        merged.insert(name.clone(), combined);
    }
    merged
}

/// Resolves nodes against one root document and collects degradations.
#[derive(Debug)]
pub struct Resolver<'a> {
    root: &'a Value,
    max_depth: usize,
    degradations: Vec<Degradation>,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Value, options: &InterpretOptions) -> Self {
        Self {
            root,
            max_depth: options.max_depth,
            degradations: Vec::new(),
        }
    }

    /// Resolve one schema node. `path` locates it for degradation reports.
    ///
    /// Never fails: unresolvable, external and cyclic refs are dropped and
    /// recorded, and the merge continues with the locally known keywords.
    pub fn resolve(&mut self, node: &Value, path: &str) -> ResolvedProperty {
        let mut chain = Vec::new();
        self.resolve_node(node, path, &mut chain, 0)
    }

    /// Record a non-fatal anomaly.
    pub fn degrade(&mut self, kind: DegradationKind, path: &str, message: impl Into<String>) {
        let message = message.into();
        match kind {
            DegradationKind::IgnoredVariants => {
                tracing::debug!(path, kind = ?kind, "{}", message)
            }
            _ => tracing::warn!(path, kind = ?kind, "{}", message),
        }
        self.degradations.push(Degradation {
            kind,
            path: path.to_string(),
            message,
        });
    }

    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    /// Consume the resolver, returning everything it recorded.
    pub fn finish(self) -> Vec<Degradation> {
        self.degradations
    }

    fn resolve_node(
        &mut self,
        node: &Value,
        path: &str,
        chain: &mut Vec<String>,
        depth: usize,
    ) -> ResolvedProperty {
        let Value::Object(map) = node else {
            return ResolvedProperty::default();
        };

        if SchemaNode::classify(map) != SchemaNode::Composed {
            return ResolvedProperty(map.clone());
        }

        let local: Map<String, Value> = map
            .iter()
            .filter(|(k, _)| !COMPOSITION_KEYWORDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut resolved = ResolvedProperty(local);

        if depth >= self.max_depth {
            self.degrade(
                DegradationKind::DepthExceeded,
                path,
                format!(
                    "composition nested deeper than {}; keeping local keywords only",
                    self.max_depth
                ),
            );
            return resolved;
        }

        // $ref target first, the node's own keywords on top
        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            let ref_path = format!("{}/$ref", path);
            if let Some(target) = self.lookup(reference, &ref_path, chain) {
                chain.push(reference.to_string());
                let target = self.resolve_node(target, reference, chain, depth + 1);
                chain.pop();
                resolved = merge(&target, &resolved);
            }
        }

        if let Some(Value::Array(branches)) = map.get("allOf") {
            for (i, branch) in branches.iter().enumerate() {
                let branch_path = format!("{}/allOf/{}", path, i);
                let branch = self.resolve_node(branch, &branch_path, chain, depth + 1);
                resolved = merge(&resolved, &branch);
            }
        }

        for keyword in ["oneOf", "anyOf"] {
            let Some(Value::Array(branches)) = map.get(keyword) else {
                continue;
            };
            let Some(first) = branches.first() else {
                continue;
            };
            if branches.len() > 1 {
                self.degrade(
                    DegradationKind::IgnoredVariants,
                    &format!("{}/{}", path, keyword),
                    format!(
                        "using the first of {} {} branches; the rest are ignored",
                        branches.len(),
                        keyword
                    ),
                );
            }
            let branch_path = format!("{}/{}/0", path, keyword);
            let branch = self.resolve_node(first, &branch_path, chain, depth + 1);
            resolved = merge(&resolved, &branch);
        }

        resolved
    }

    fn lookup(&mut self, reference: &str, path: &str, chain: &[String]) -> Option<&'a Value> {
        if !is_local_ref(reference) {
            self.degrade(
                DegradationKind::ExternalRef,
                path,
                format!("external reference {} is not fetched", reference),
            );
            return None;
        }

        if chain.iter().any(|r| r == reference) {
            self.degrade(
                DegradationKind::CyclicRef,
                path,
                format!("reference cycle through {}", reference),
            );
            return None;
        }

        let root = self.root;
        match navigate_fragment(root, reference) {
            Some(target) => Some(target),
            None => {
                self.degrade(
                    DegradationKind::UnresolvedRef,
                    path,
                    format!("reference not found: {}", reference),
                );
                None
            }
        }
    }
}

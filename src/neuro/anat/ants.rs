// SPDX-License-Identifier: MIT

//! ANTs-style anatomical workflows
//!
//! `brain_extraction` assembles the front of the antsBrainExtraction
//! pipeline for 3D images: an input aggregator, a per-image N4 bias-field
//! correction and an output aggregator.
//!
//! Inputs
//!
//! - `in_file`: the anatomical image(s), typically T1-weighted. When several
//!   are given, only the first is used to register priors, so list the T1w
//!   first.
//! - `in_template`: brain template the priors are projected from.
//! - `in_mask`: brain probability mask in template space.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::{
    resolve_thread_count, FieldRecord, GraphError, HostInfo, IdentityInterface, Node, OneOrMany,
    Result, Transform, Workflow,
};
use crate::neuro::interfaces::ants::N4BiasFieldCorrection;

pub const INPUT_NODE: &str = "inputnode";
pub const OUTPUT_NODE: &str = "outputnode";
pub const N4_NODE: &str = "inu_n4";

/// Construction options for [`brain_extraction`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrainExtractionOptions {
    pub name: String,
    /// Run tools in single precision where supported
    pub use_float: bool,
    pub debug: bool,
    pub random_seeding: bool,
    /// `None` or anything below 1 means every host processor
    pub thread_count: Option<i64>,
}

impl Default for BrainExtractionOptions {
    fn default() -> Self {
        Self {
            name: "antsBrainExtraction".to_string(),
            use_float: true,
            debug: false,
            random_seeding: true,
            thread_count: None,
        }
    }
}

/// Values exposed by the input node
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrainExtractionInputs {
    pub in_file: Option<OneOrMany<PathBuf>>,
    pub in_template: Option<PathBuf>,
    pub in_mask: Option<PathBuf>,
}

impl FieldRecord for BrainExtractionInputs {
    fn field_names() -> &'static [&'static str] {
        &["in_file", "in_template", "in_mask"]
    }
}

/// Values collected by the output node
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrainExtractionOutputs {
    pub bias_corrected: Vec<PathBuf>,
    pub out_file: Option<PathBuf>,
    pub out_mask: Option<PathBuf>,
    pub bias_image: Vec<PathBuf>,
}

impl FieldRecord for BrainExtractionOutputs {
    fn field_names() -> &'static [&'static str] {
        &["bias_corrected", "out_file", "out_mask", "bias_image"]
    }
}

/// Build the brain-extraction workflow graph.
pub fn brain_extraction(options: &BrainExtractionOptions, host: &dyn HostInfo) -> Result<Workflow> {
    let omp_nthreads = resolve_thread_count(options.thread_count, host);
    log::debug!(
        "Building '{}' (threads={}, float={}, debug={}, random_seeding={})",
        options.name,
        omp_nthreads,
        options.use_float,
        options.debug,
        options.random_seeding
    );

    let mut wf = Workflow::new(options.name.clone());

    let inputnode = Node::new(
        IdentityInterface::from_record::<BrainExtractionInputs>(),
        INPUT_NODE,
    );
    let outputnode = Node::new(
        IdentityInterface::from_record::<BrainExtractionOutputs>(),
        OUTPUT_NODE,
    );
    let inu_n4 = Node::map(
        N4BiasFieldCorrection {
            dimension: 3,
            save_bias: true,
            num_threads: omp_nthreads,
            copy_header: true,
            ..Default::default()
        },
        N4_NODE,
        ["input_image"],
        Some(omp_nthreads),
    )?;

    wf.add_nodes([inputnode, outputnode, inu_n4])?;

    wf.connect_with(
        INPUT_NODE,
        "in_file",
        N4_NODE,
        "input_image",
        Some(Transform::AsList),
    )?;
    wf.connect(N4_NODE, "output_image", OUTPUT_NODE, "bias_corrected")?;
    wf.connect(N4_NODE, "bias_image", OUTPUT_NODE, "bias_image")?;

    log::info!(
        "Built workflow '{}' with {} nodes and {} connections",
        wf.name(),
        wf.nodes().len(),
        wf.connections().len()
    );
    Ok(wf)
}

/// Preset the given values on the workflow's input node.
pub fn set_inputs(wf: &mut Workflow, inputs: &BrainExtractionInputs) -> Result<()> {
    let values = serde_json::to_value(inputs)?;
    let node = wf
        .node_mut(INPUT_NODE)
        .ok_or_else(|| GraphError::NodeNotFound(INPUT_NODE.to_string()))?;

    if let Some(map) = values.as_object() {
        for (field, value) in map.iter().filter(|(_, v)| !v.is_null()) {
            node.set_input(field, value.clone())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FixedHost, Interface, NodeKind};
    use serde_json::json;

    fn build(thread_count: Option<i64>) -> Workflow {
        let options = BrainExtractionOptions {
            name: "bx".to_string(),
            thread_count,
            ..Default::default()
        };
        brain_extraction(&options, &FixedHost(8)).unwrap()
    }

    fn n4_threads(wf: &Workflow) -> serde_json::Value {
        wf.node(N4_NODE).unwrap().interface().parameters()["num_threads"].clone()
    }

    #[test]
    fn test_default_options() {
        let opts = BrainExtractionOptions::default();
        assert_eq!(opts.name, "antsBrainExtraction");
        assert!(opts.use_float);
        assert!(!opts.debug);
        assert!(opts.random_seeding);
        assert_eq!(opts.thread_count, None);
    }

    #[test]
    fn test_thread_count_defaults_to_host() {
        assert_eq!(n4_threads(&build(None)), json!(8));
        assert_eq!(n4_threads(&build(Some(0))), json!(8));
        assert_eq!(n4_threads(&build(Some(-1))), json!(8));
    }

    #[test]
    fn test_explicit_thread_count() {
        let wf = build(Some(4));
        assert_eq!(n4_threads(&wf), json!(4));
        assert_eq!(wf.node(N4_NODE).unwrap().n_procs(), Some(4));
    }

    #[test]
    fn test_n4_configuration() {
        let wf = build(Some(2));
        let node = wf.node(N4_NODE).unwrap();
        let params = node.interface().parameters();
        assert_eq!(node.interface().name(), "N4BiasFieldCorrection");
        assert_eq!(params["dimension"], 3);
        assert_eq!(params["save_bias"], true);
        assert_eq!(params["copy_header"], true);
        assert_eq!(
            node.kind(),
            &NodeKind::Map {
                iterfield: vec!["input_image".to_string()]
            }
        );
    }

    #[test]
    fn test_exactly_three_nodes_with_expected_fields() {
        let wf = build(None);
        let names: Vec<_> = wf.nodes().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec![INPUT_NODE, OUTPUT_NODE, N4_NODE]);

        let inputs = wf.node(INPUT_NODE).unwrap().interface();
        assert_eq!(inputs.input_fields(), &["in_file", "in_template", "in_mask"]);
        let outputs = wf.node(OUTPUT_NODE).unwrap().interface();
        assert_eq!(
            outputs.output_fields(),
            &["bias_corrected", "out_file", "out_mask", "bias_image"]
        );
    }

    #[test]
    fn test_flags_do_not_change_graph_shape() {
        let options = BrainExtractionOptions {
            name: "bx".to_string(),
            use_float: false,
            debug: true,
            random_seeding: false,
            thread_count: Some(3),
        };
        let wf = brain_extraction(&options, &FixedHost(8)).unwrap();
        assert_eq!(wf.nodes().len(), 3);
        assert_eq!(wf.connections().len(), 3);
    }

    #[test]
    fn test_connections() {
        let wf = build(None);
        let incoming: Vec<_> = wf.incoming(N4_NODE).collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].source, INPUT_NODE);
        assert_eq!(incoming[0].source_field, "in_file");
        assert_eq!(incoming[0].target_field, "input_image");
        assert_eq!(incoming[0].transform, Some(Transform::AsList));

        let mut outgoing: Vec<_> = wf
            .outgoing(N4_NODE)
            .map(|c| (c.source_field.as_str(), c.target_field.as_str()))
            .collect();
        outgoing.sort();
        assert_eq!(
            outgoing,
            vec![
                ("bias_image", "bias_image"),
                ("output_image", "bias_corrected")
            ]
        );
        assert!(wf.graph().isolated().is_empty());
    }

    #[test]
    fn test_set_inputs() {
        let mut wf = build(None);
        let inputs = BrainExtractionInputs {
            in_file: Some(PathBuf::from("sub-01_T1w.nii.gz").into()),
            in_template: Some(PathBuf::from("tpl.nii.gz")),
            in_mask: None,
        };
        set_inputs(&mut wf, &inputs).unwrap();

        let node = wf.node(INPUT_NODE).unwrap();
        assert_eq!(node.inputs()["in_file"], json!("sub-01_T1w.nii.gz"));
        assert_eq!(node.inputs()["in_template"], json!("tpl.nii.gz"));
        assert!(!node.inputs().contains_key("in_mask"));
    }

    fn serialized_keys<T: Serialize>(record: &T) -> Vec<String> {
        let value = serde_json::to_value(record).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<_> = names.iter().map(|n| n.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_records_serialize_declared_fields() {
        assert_eq!(
            serialized_keys(&BrainExtractionInputs::default()),
            sorted(BrainExtractionInputs::field_names())
        );
        assert_eq!(
            serialized_keys(&BrainExtractionOutputs::default()),
            sorted(BrainExtractionOutputs::field_names())
        );
    }

    #[test]
    fn test_options_from_yaml_partial() {
        let opts: BrainExtractionOptions = serde_yaml::from_str("thread_count: 2").unwrap();
        assert_eq!(opts.thread_count, Some(2));
        assert_eq!(opts.name, "antsBrainExtraction");
    }
}

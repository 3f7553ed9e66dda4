//! Tcl script generation for the OpenSees binary.
//!
//! Serializes a model, its catalogs and one load case into a single
//! `model.tcl` script. Generation is deterministic: nodes and frames are
//! written in ascending id order and all derived tags are computed from
//! frame ids, so regenerating the same model yields the same script.
//!
//! The elastic beam-column formulation has no native partial end release,
//! so released ends are encoded with auxiliary nodes: each released frame
//! end gets a coincident extra node and a zero-length connector element
//! whose six uniaxial springs are rigid for kept DOFs and near-zero for
//! released ones. The beam element is then wired to the auxiliary node
//! instead of the real one.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::catalog::{Material, MaterialMap, Section, SectionMap};
use crate::error::EngineError;
use crate::loads::{
    DistributedLoad, LoadCase, LoadDirection, NodalLoad, PointLoadDirection, PointLoadOnFrame,
};
use crate::model::{Frame, LocalAxes, Node, StructuralModel};

/// Auxiliary release node id base: `RELEASE_NODE_OFFSET + frame_id*2 (+1 for end j)`
pub const RELEASE_NODE_OFFSET: u32 = 1_000_000;
/// Zero-length connector element id base, same derivation as the node ids
pub const RELEASE_ELEMENT_OFFSET: u32 = 1_000_000;
/// Tag of the rigid spring material; the soft one is this plus one
pub const RELEASE_MATERIAL_TAG: u32 = 9001;
/// Spring stiffness for non-released DOFs
pub const RIGID_STIFFNESS: f64 = 1.0e12;
/// Spring stiffness for released DOFs
pub const RELEASE_STIFFNESS: f64 = 1.0e-6;

/// Standard gravity, m/s2
const GRAVITY_ACCEL: f64 = 9.81;
/// Segment count when decomposing partial/trapezoidal loads into point loads
const PATCH_SEGMENTS: usize = 10;
/// Lever arm for the force couple replacing an interior moment, as a
/// fraction of frame length
const MOMENT_COUPLE_ARM: f64 = 0.02;

const SCRIPT_NAME: &str = "model.tcl";

fn sci(v: f64) -> String {
    format!("{v:.6e}")
}

/// Writes OpenSees Tcl input scripts into a working directory.
pub struct TclWriter {
    work_dir: PathBuf,
}

impl TclWriter {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn script_path(&self) -> PathBuf {
        self.work_dir.join(SCRIPT_NAME)
    }

    /// Serialize the model plus one load case and write `model.tcl`.
    ///
    /// Fails if a frame references a material or section missing from the
    /// catalogs; loads referencing unknown frames are skipped with a
    /// warning instead, since they cannot invalidate the model itself.
    #[allow(clippy::too_many_arguments)]
    pub fn write_model(
        &self,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
        load_case: &LoadCase,
        nodal_loads: &[NodalLoad],
        distributed_loads: &[DistributedLoad],
        point_loads: &[PointLoadOnFrame],
    ) -> Result<PathBuf, EngineError> {
        let mut s = String::new();

        s.push_str("# OpenSees static linear analysis\n");
        s.push_str(&format!("# Load case: {}\n", load_case.name));
        s.push_str("wipe\n");
        s.push_str("model basic -ndm 3 -ndf 6\n\n");

        self.write_nodes(&mut s, model);
        self.write_restraints(&mut s, model);
        self.write_release_springs(&mut s, model)?;
        self.write_frames(&mut s, model, materials, sections)?;
        self.write_loads(
            &mut s,
            model,
            materials,
            sections,
            load_case,
            nodal_loads,
            distributed_loads,
            point_loads,
        )?;
        self.write_analysis(&mut s);
        self.write_output(&mut s, model);

        let path = self.script_path();
        std::fs::write(&path, &s)?;
        debug!(script = %path.display(), bytes = s.len(), "wrote solver input script");
        Ok(path)
    }

    fn write_nodes(&self, s: &mut String, model: &StructuralModel) {
        s.push_str("# Nodes\n");
        for node in model.iter_nodes() {
            s.push_str(&format!("node {} {} {} {}\n", node.id, node.x, node.y, node.z));
        }
        s.push('\n');
    }

    fn write_restraints(&self, s: &mut String, model: &StructuralModel) {
        s.push_str("# Boundary conditions\n");
        for node in model.supported_nodes() {
            let r = node.restraint.to_array();
            let flags: Vec<&str> = r.iter().map(|&b| if b { "1" } else { "0" }).collect();
            s.push_str(&format!("fix {} {}\n", node.id, flags.join(" ")));
        }
        s.push('\n');
    }

    /// Emit the shared spring materials plus per-end auxiliary nodes and
    /// zero-length connectors for every released frame end.
    fn write_release_springs(
        &self,
        s: &mut String,
        model: &StructuralModel,
    ) -> Result<(), EngineError> {
        let any_released = model
            .iter_frames()
            .any(|f| f.releases.any_released_at_i() || f.releases.any_released_at_j());
        if !any_released {
            return Ok(());
        }

        s.push_str("# End-release springs\n");
        s.push_str(&format!(
            "uniaxialMaterial Elastic {} {}\n",
            RELEASE_MATERIAL_TAG,
            sci(RIGID_STIFFNESS)
        ));
        s.push_str(&format!(
            "uniaxialMaterial Elastic {} {}\n",
            RELEASE_MATERIAL_TAG + 1,
            sci(RELEASE_STIFFNESS)
        ));

        for frame in model.iter_frames() {
            let axes = model.frame_local_axes(frame.id)?;
            if frame.releases.any_released_at_i() {
                let node = model.get_node(frame.node_i_id)?;
                self.write_release_end(s, frame, node, &axes, false);
            }
            if frame.releases.any_released_at_j() {
                let node = model.get_node(frame.node_j_id)?;
                self.write_release_end(s, frame, node, &axes, true);
            }
        }
        s.push('\n');
        Ok(())
    }

    fn write_release_end(
        &self,
        s: &mut String,
        frame: &Frame,
        real_node: &Node,
        axes: &LocalAxes,
        end_j: bool,
    ) {
        let offset = frame.id * 2 + u32::from(end_j);
        let aux_node = RELEASE_NODE_OFFSET + offset;
        let connector = RELEASE_ELEMENT_OFFSET + offset;
        let released = if end_j {
            frame.releases.end_j()
        } else {
            frame.releases.end_i()
        };

        s.push_str(&format!(
            "node {} {} {} {}\n",
            aux_node, real_node.x, real_node.y, real_node.z
        ));

        // One spring per local DOF: 1=P 2=V2 3=V3 4=T 5=M2 6=M3
        let mats: Vec<String> = released
            .iter()
            .map(|&rel| {
                let tag = if rel {
                    RELEASE_MATERIAL_TAG + 1
                } else {
                    RELEASE_MATERIAL_TAG
                };
                tag.to_string()
            })
            .collect();
        let x = axes.axis1;
        let y = axes.axis2;
        s.push_str(&format!(
            "element zeroLength {} {} {} -mat {} -dir 1 2 3 4 5 6 -orient {} {} {} {} {} {}\n",
            connector,
            real_node.id,
            aux_node,
            mats.join(" "),
            x[0], x[1], x[2], y[0], y[1], y[2]
        ));
    }

    /// Node id the beam element connects to at the given end, accounting
    /// for release substitution.
    fn beam_end_node(frame: &Frame, end_j: bool) -> u32 {
        let released = if end_j {
            frame.releases.any_released_at_j()
        } else {
            frame.releases.any_released_at_i()
        };
        if released {
            RELEASE_NODE_OFFSET + frame.id * 2 + u32::from(end_j)
        } else if end_j {
            frame.node_j_id
        } else {
            frame.node_i_id
        }
    }

    fn write_frames(
        &self,
        s: &mut String,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
    ) -> Result<(), EngineError> {
        s.push_str("# Frame elements\n");
        for frame in model.iter_frames() {
            let material = lookup_material(materials, frame)?;
            let section = lookup_section(sections, frame)?;
            let axes = model.frame_local_axes(frame.id)?;

            // geomTransf vector is the local 3 axis (OpenSees local z)
            let v = axes.axis3;
            s.push_str(&format!(
                "geomTransf Linear {} {} {} {}\n",
                frame.id, v[0], v[1], v[2]
            ));
            s.push_str(&format!(
                "element elasticBeamColumn {} {} {} {} {} {} {} {} {} {}\n",
                frame.id,
                Self::beam_end_node(frame, false),
                Self::beam_end_node(frame, true),
                sci(section.area),
                sci(material.elastic_modulus),
                sci(material.shear_modulus()),
                sci(section.torsional_constant),
                sci(section.i22),
                sci(section.i33),
                frame.id
            ));
        }
        s.push('\n');
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_loads(
        &self,
        s: &mut String,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
        load_case: &LoadCase,
        nodal_loads: &[NodalLoad],
        distributed_loads: &[DistributedLoad],
        point_loads: &[PointLoadOnFrame],
    ) -> Result<(), EngineError> {
        s.push_str("# Loads\n");
        s.push_str("timeSeries Linear 1\n");
        s.push_str("pattern Plain 1 1 {\n");

        for load in nodal_loads {
            if !model.has_node(load.node_id) {
                warn!(node_id = load.node_id, "nodal load references missing node, skipped");
                continue;
            }
            s.push_str(&format!(
                "    load {} {} {} {} {} {} {}\n",
                load.node_id,
                sci(load.fx),
                sci(load.fy),
                sci(load.fz),
                sci(load.mx),
                sci(load.my),
                sci(load.mz)
            ));
        }

        if load_case.includes_self_weight() {
            self.write_self_weight(s, model, materials, sections, load_case)?;
        }

        for load in distributed_loads {
            self.write_distributed_load(s, model, load)?;
        }

        for load in point_loads {
            self.write_point_load(s, model, load)?;
        }

        s.push_str("}\n\n");
        Ok(())
    }

    /// Self-weight as a uniform member load in global -Z, scaled by the
    /// load case multiplier. Density kg/m3 converts to kN/m via g/1000.
    fn write_self_weight(
        &self,
        s: &mut String,
        model: &StructuralModel,
        materials: &MaterialMap,
        sections: &SectionMap,
        load_case: &LoadCase,
    ) -> Result<(), EngineError> {
        for frame in model.iter_frames() {
            let material = lookup_material(materials, frame)?;
            let section = lookup_section(sections, frame)?;
            let w = material.density * section.area * GRAVITY_ACCEL / 1000.0
                * load_case.self_weight_multiplier;
            if w == 0.0 {
                continue;
            }
            let axes = model.frame_local_axes(frame.id)?;
            let local = axes.global_to_local([0.0, 0.0, -w]);
            s.push_str(&format!(
                "    eleLoad -ele {} -type -beamUniform {} {} {}\n",
                frame.id,
                sci(local[1]),
                sci(local[2]),
                sci(local[0])
            ));
        }
        Ok(())
    }

    /// Unit vector of a load direction in the frame's local system
    fn local_direction(axes: &LocalAxes, direction: LoadDirection) -> [f64; 3] {
        match direction {
            LoadDirection::LocalX => [1.0, 0.0, 0.0],
            LoadDirection::LocalY => [0.0, 1.0, 0.0],
            LoadDirection::LocalZ => [0.0, 0.0, 1.0],
            LoadDirection::GlobalX => axes.global_to_local([1.0, 0.0, 0.0]),
            LoadDirection::GlobalY => axes.global_to_local([0.0, 1.0, 0.0]),
            LoadDirection::GlobalZ => axes.global_to_local([0.0, 0.0, 1.0]),
            LoadDirection::Gravity => axes.global_to_local([0.0, 0.0, -1.0]),
        }
    }

    fn write_distributed_load(
        &self,
        s: &mut String,
        model: &StructuralModel,
        load: &DistributedLoad,
    ) -> Result<(), EngineError> {
        if !model.has_frame(load.frame_id) {
            warn!(
                frame_id = load.frame_id,
                "distributed load references missing frame, skipped"
            );
            return Ok(());
        }
        let axes = model.frame_local_axes(load.frame_id)?;
        let u = Self::local_direction(&axes, load.direction);

        if load.is_uniform() && load.is_full_length() {
            let w = load.w_start;
            s.push_str(&format!(
                "    eleLoad -ele {} -type -beamUniform {} {} {}\n",
                load.frame_id,
                sci(w * u[1]),
                sci(w * u[2]),
                sci(w * u[0])
            ));
            return Ok(());
        }

        // No native trapezoidal or partial member load: decompose into
        // statically equivalent point loads at segment centroids.
        let length = model.frame_length(load.frame_id)?;
        let span = load.end_loc - load.start_loc;
        let seg = span / PATCH_SEGMENTS as f64;
        for k in 0..PATCH_SEGMENTS {
            let mid = load.start_loc + (k as f64 + 0.5) * seg;
            let force = load.intensity_at(mid) * seg * length;
            if force == 0.0 {
                continue;
            }
            s.push_str(&format!(
                "    eleLoad -ele {} -type -beamPoint {} {} {} {}\n",
                load.frame_id,
                sci(force * u[1]),
                sci(force * u[2]),
                mid,
                sci(force * u[0])
            ));
        }
        Ok(())
    }

    fn point_direction(axes: &LocalAxes, direction: PointLoadDirection) -> [f64; 3] {
        match direction {
            PointLoadDirection::LocalX => [1.0, 0.0, 0.0],
            PointLoadDirection::LocalY => [0.0, 1.0, 0.0],
            PointLoadDirection::LocalZ => [0.0, 0.0, 1.0],
            PointLoadDirection::GlobalX => axes.global_to_local([1.0, 0.0, 0.0]),
            PointLoadDirection::GlobalY => axes.global_to_local([0.0, 1.0, 0.0]),
            PointLoadDirection::GlobalZ => axes.global_to_local([0.0, 0.0, 1.0]),
            PointLoadDirection::Gravity => axes.global_to_local([0.0, 0.0, -1.0]),
        }
    }

    fn write_point_load(
        &self,
        s: &mut String,
        model: &StructuralModel,
        load: &PointLoadOnFrame,
    ) -> Result<(), EngineError> {
        if !model.has_frame(load.frame_id) {
            warn!(frame_id = load.frame_id, "point load references missing frame, skipped");
            return Ok(());
        }
        let frame = model.get_frame(load.frame_id)?;
        let axes = model.frame_local_axes(load.frame_id)?;
        let length = model.frame_length(load.frame_id)?;
        let u = Self::point_direction(&axes, load.direction);
        let at_end = load.is_at_start() || load.is_at_end();

        if load.p != 0.0 {
            if at_end {
                // End forces go straight onto the real node in global axes
                let node_id = if load.is_at_start() {
                    frame.node_i_id
                } else {
                    frame.node_j_id
                };
                let g = axes.local_to_global([load.p * u[0], load.p * u[1], load.p * u[2]]);
                s.push_str(&format!(
                    "    load {} {} {} {} 0 0 0\n",
                    node_id,
                    sci(g[0]),
                    sci(g[1]),
                    sci(g[2])
                ));
            } else {
                s.push_str(&format!(
                    "    eleLoad -ele {} -type -beamPoint {} {} {} {}\n",
                    load.frame_id,
                    sci(load.p * u[1]),
                    sci(load.p * u[2]),
                    load.location,
                    sci(load.p * u[0])
                ));
            }
        }

        if load.m != 0.0 {
            self.write_point_moment(s, frame, &axes, length, load, u, at_end);
        }
        Ok(())
    }

    /// Moment acts about the bending axis its companion force excites
    /// (force along local 2 bends about local 3 and vice versa). Axial
    /// directions would make it a torque, which the member-load protocol
    /// cannot express away from the ends.
    #[allow(clippy::too_many_arguments)]
    fn write_point_moment(
        &self,
        s: &mut String,
        frame: &Frame,
        axes: &LocalAxes,
        length: f64,
        load: &PointLoadOnFrame,
        u: [f64; 3],
        at_end: bool,
    ) {
        // Moment axis in local coordinates: x-hat cross force direction
        let axis = [0.0, -u[2], u[1]];
        let norm = (axis[1] * axis[1] + axis[2] * axis[2]).sqrt();

        if at_end {
            let node_id = if load.is_at_start() {
                frame.node_i_id
            } else {
                frame.node_j_id
            };
            let local_m = if norm > 1e-9 {
                [0.0, load.m * axis[1] / norm, load.m * axis[2] / norm]
            } else {
                // Degenerate force direction: apply as torsion
                [load.m, 0.0, 0.0]
            };
            let g = axes.local_to_global(local_m);
            s.push_str(&format!(
                "    load {} 0 0 0 {} {} {}\n",
                node_id,
                sci(g[0]),
                sci(g[1]),
                sci(g[2])
            ));
            return;
        }

        if norm <= 1e-9 {
            warn!(
                frame_id = load.frame_id,
                location = load.location,
                "interior torsional moment has no member-load equivalent, skipped"
            );
            return;
        }

        // Interior span moment as a statically equivalent force couple
        let half = MOMENT_COUPLE_ARM / 2.0;
        let mut lo = load.location - half;
        let mut hi = load.location + half;
        if lo < 0.0 {
            hi -= lo;
            lo = 0.0;
        }
        if hi > 1.0 {
            lo -= hi - 1.0;
            hi = 1.0;
        }
        let arm = (hi - lo) * length;
        let f = load.m / arm;
        for (loc, sign) in [(hi, 1.0), (lo, -1.0)] {
            s.push_str(&format!(
                "    eleLoad -ele {} -type -beamPoint {} {} {} {}\n",
                load.frame_id,
                sci(sign * f * u[1] / norm),
                sci(sign * f * u[2] / norm),
                loc,
                sci(sign * f * u[0] / norm)
            ));
        }
    }

    fn write_analysis(&self, s: &mut String) {
        s.push_str("# Analysis\n");
        s.push_str("constraints Transformation\n");
        s.push_str("numberer RCM\n");
        s.push_str("system BandGeneral\n");
        s.push_str("algorithm Linear\n");
        s.push_str("integrator LoadControl 1.0\n");
        s.push_str("analysis Static\n");
        s.push_str("set ok [analyze 1]\n\n");
    }

    /// Recorder-free result dump: plain Tcl loops writing one line per
    /// node/element, easy to parse back.
    fn write_output(&self, s: &mut String, model: &StructuralModel) {
        let node_ids: Vec<String> = model.iter_nodes().map(|n| n.id.to_string()).collect();
        let supported_ids: Vec<String> =
            model.supported_nodes().map(|n| n.id.to_string()).collect();
        let frame_ids: Vec<String> = model.iter_frames().map(|f| f.id.to_string()).collect();

        s.push_str("if {$ok == 0} {\n");
        s.push_str("    set out [open \"node_displacements.out\" w]\n");
        s.push_str(&format!("    foreach nodeId {{{}}} {{\n", node_ids.join(" ")));
        s.push_str("        puts $out \"$nodeId [nodeDisp $nodeId]\"\n");
        s.push_str("    }\n");
        s.push_str("    close $out\n");
        s.push_str("    reactions\n");
        s.push_str("    set out [open \"node_reactions.out\" w]\n");
        s.push_str(&format!(
            "    foreach nodeId {{{}}} {{\n",
            supported_ids.join(" ")
        ));
        s.push_str("        puts $out \"$nodeId [nodeReaction $nodeId]\"\n");
        s.push_str("    }\n");
        s.push_str("    close $out\n");
        s.push_str("    set out [open \"element_forces.out\" w]\n");
        s.push_str(&format!("    foreach eleId {{{}}} {{\n", frame_ids.join(" ")));
        s.push_str("        puts $out \"$eleId [eleResponse $eleId localForces]\"\n");
        s.push_str("    }\n");
        s.push_str("    close $out\n");
        s.push_str("    puts \"ANALYSIS COMPLETE\"\n");
        s.push_str("} else {\n");
        s.push_str("    puts \"ANALYSIS FAILED\"\n");
        s.push_str("}\n");
        s.push_str("wipe\n");
    }
}

fn lookup_material<'a>(
    materials: &'a MaterialMap,
    frame: &Frame,
) -> Result<&'a Material, EngineError> {
    materials
        .get(&frame.material_name)
        .ok_or_else(|| EngineError::UnknownMaterial {
            frame_id: frame.id,
            name: frame.material_name.clone(),
        })
}

fn lookup_section<'a>(
    sections: &'a SectionMap,
    frame: &Frame,
) -> Result<&'a Section, EngineError> {
    sections
        .get(&frame.section_name)
        .ok_or_else(|| EngineError::UnknownSection {
            frame_id: frame.id,
            name: frame.section_name.clone(),
        })
}

//! The session object: owns the kernel and the current horn.

use std::fmt;
use std::str::FromStr;

use horn_format::{write_ascii_stl, write_binary_stl, ExportError, SOLID_NAME};
use horn_kernel::{Kernel, KernelSolidHandle};
use horn_ops::{
    generate_mesh, generate_profile, resolve_parameters, HornMetrics, MeshSource, OpError,
};
use horn_types::{AcousticParameters, CameraFit, HornInputs, Mesh, ProfileSample};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::errors::EngineError;

/// Everything produced by one successful generation.
#[derive(Debug, Clone)]
pub struct Generation {
    pub parameters: AcousticParameters,
    pub samples: Vec<ProfileSample>,
    pub mesh: Mesh,
    pub camera: CameraFit,
    pub metrics: HornMetrics,
    pub source: MeshSource,
    solid: Option<KernelSolidHandle>,
}

impl Generation {
    /// Whether the kernel holds a solid for this horn.
    pub fn has_solid(&self) -> bool {
        self.solid.is_some()
    }
}

/// Renderer collaborator that displays the current mesh.
pub trait MeshSink {
    fn show(&mut self, mesh: &Mesh, camera: &CameraFit);
}

/// Which encoder produces the exchange file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportRoute {
    /// Kernel solid if there is one, otherwise ASCII from the mesh.
    #[default]
    Auto,
    /// The kernel's own binary STL writer.
    Native,
    /// ASCII STL of the current mesh.
    Ascii,
    /// Binary STL of the current mesh.
    Binary,
}

impl fmt::Display for ExportRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportRoute::Auto => f.write_str("auto"),
            ExportRoute::Native => f.write_str("native"),
            ExportRoute::Ascii => f.write_str("ascii"),
            ExportRoute::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for ExportRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ExportRoute::Auto),
            "native" => Ok(ExportRoute::Native),
            "ascii" => Ok(ExportRoute::Ascii),
            "binary" => Ok(ExportRoute::Binary),
            other => Err(format!(
                "unknown export format `{other}` (expected auto, native, ascii or binary)"
            )),
        }
    }
}

/// An encoded exchange file.
#[derive(Debug, Clone)]
pub struct Exported {
    /// The route actually taken; never `Auto`.
    pub route: ExportRoute,
    pub bytes: Vec<u8>,
}

/// Owns the optional geometry kernel and the single current generation.
///
/// Generations are sequential. A new one replaces the previous and releases
/// its kernel solid; a failed one leaves the previous in place.
pub struct HornSession<K: Kernel> {
    kernel: Option<K>,
    config: PipelineConfig,
    current: Option<Generation>,
}

impl<K: Kernel> HornSession<K> {
    /// Create a session. Without a kernel every horn is lathed directly.
    pub fn new(kernel: Option<K>, config: PipelineConfig) -> Self {
        Self {
            kernel,
            config,
            current: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn kernel(&self) -> Option<&K> {
        self.kernel.as_ref()
    }

    pub fn current(&self) -> Option<&Generation> {
        self.current.as_ref()
    }

    /// Validate the configuration and inputs, build the profile and mesh it,
    /// then make the result current.
    #[instrument(skip_all, fields(kind = %inputs.horn_type, auto_length = inputs.auto_length))]
    pub fn generate(&mut self, inputs: &HornInputs) -> Result<&Generation, EngineError> {
        self.config.validate()?;
        let parameters = resolve_parameters(inputs)?;
        let samples = generate_profile(&parameters);

        let provided = generate_mesh(
            self.kernel.as_mut(),
            &samples,
            self.config.tolerance,
            self.config.radial_subdivisions,
        )
        .map_err(EngineError::GenerationFailed)?;

        let Some(camera) = provided.mesh.camera_fit() else {
            if let (Some(kernel), Some(solid)) = (self.kernel.as_mut(), &provided.solid) {
                kernel.release(solid);
            }
            return Err(EngineError::GenerationFailed(OpError::MeshExtraction {
                reason: "mesh has no vertices".to_string(),
            }));
        };
        let metrics = HornMetrics::compute(&parameters, &samples);

        if let Some(previous) = self.current.take() {
            if let (Some(kernel), Some(solid)) = (self.kernel.as_mut(), previous.solid) {
                kernel.release(&solid);
            }
        }

        info!(
            source = %provided.source,
            vertices = provided.mesh.vertex_count(),
            triangles = provided.mesh.triangle_count(),
            length = parameters.length(),
            "generated horn"
        );

        Ok(&*self.current.insert(Generation {
            parameters,
            samples,
            mesh: provided.mesh,
            camera,
            metrics,
            source: provided.source,
            solid: provided.solid,
        }))
    }

    /// Hand the current mesh and its framing to a renderer.
    pub fn display(&self, sink: &mut dyn MeshSink) -> Result<(), EngineError> {
        let current = self.current.as_ref().ok_or(EngineError::NoCurrentShape)?;
        sink.show(&current.mesh, &current.camera);
        Ok(())
    }

    /// Encode the current horn as STL.
    #[instrument(skip(self))]
    pub fn export(&mut self, route: ExportRoute) -> Result<Exported, EngineError> {
        let current = self.current.as_ref().ok_or(EngineError::NoCurrentShape)?;

        let route = match route {
            ExportRoute::Auto if current.solid.is_some() && self.kernel.is_some() => {
                ExportRoute::Native
            }
            ExportRoute::Auto => ExportRoute::Ascii,
            other => other,
        };

        let bytes = match route {
            ExportRoute::Native => {
                let (Some(kernel), Some(solid)) = (self.kernel.as_mut(), &current.solid) else {
                    return Err(ExportError::KernelExport(
                        "current horn has no kernel solid".to_string(),
                    )
                    .into());
                };
                kernel
                    .export_stl(solid, self.config.export_tolerance)
                    .map_err(|e| ExportError::KernelExport(e.to_string()))?
            }
            ExportRoute::Binary => write_binary_stl(&current.mesh, SOLID_NAME)?,
            _ => write_ascii_stl(&current.mesh, SOLID_NAME)?.into_bytes(),
        };

        info!(%route, bytes = bytes.len(), "exported horn");
        Ok(Exported { route, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horn_format::{parse_ascii_stl, parse_binary_stl, StlFacet};
    use horn_kernel::{MockFailure, MockKernel, TruckKernel};
    use horn_ops::signed_volume;
    use horn_types::ProfileKind;

    fn inputs() -> HornInputs {
        HornInputs {
            segments: 8,
            ..HornInputs::default()
        }
    }

    fn session(kernel: Option<MockKernel>) -> HornSession<MockKernel> {
        HornSession::new(kernel, PipelineConfig::default())
    }

    #[derive(Default)]
    struct RecordingSink {
        shown: Vec<(usize, CameraFit)>,
    }

    impl MeshSink for RecordingSink {
        fn show(&mut self, mesh: &Mesh, camera: &CameraFit) {
            self.shown.push((mesh.triangle_count(), *camera));
        }
    }

    #[test]
    fn generate_with_kernel_keeps_solid() {
        let mut s = session(Some(MockKernel::new()));
        let generation = s.generate(&inputs()).unwrap();
        assert_eq!(generation.source, MeshSource::KernelBacked);
        assert!(generation.has_solid());
        assert_eq!(generation.samples.len(), 9);
        assert!(generation.camera.radius > 0.0);
    }

    #[test]
    fn regenerate_releases_previous_solid() {
        let mut s = session(Some(MockKernel::new()));
        s.generate(&inputs()).unwrap();
        s.generate(&HornInputs {
            horn_type: ProfileKind::Tractrix,
            ..inputs()
        })
        .unwrap();
        assert_eq!(s.kernel().unwrap().solid_count(), 1);
        assert_eq!(s.current().unwrap().parameters.kind(), ProfileKind::Tractrix);
    }

    #[test]
    fn invalid_inputs_leave_current_untouched() {
        let mut s = session(Some(MockKernel::new()));
        s.generate(&inputs()).unwrap();
        let before = s.current().unwrap().mesh.clone();

        let bad = HornInputs {
            mouth_diameter: 10.0,
            ..inputs()
        };
        assert!(matches!(
            s.generate(&bad),
            Err(EngineError::Op(OpError::InvalidParameter { .. }))
        ));
        assert_eq!(s.current().unwrap().mesh, before);
        assert_eq!(s.kernel().unwrap().solid_count(), 1);
    }

    #[test]
    fn unusable_config_is_rejected_before_meshing() {
        let config = PipelineConfig {
            radial_subdivisions: 2,
            ..PipelineConfig::default()
        };
        let mut s = HornSession::new(Some(MockKernel::new()), config);
        assert_eq!(s.config().radial_subdivisions, 2);

        assert!(matches!(
            s.generate(&inputs()),
            Err(EngineError::Op(OpError::InvalidParameter { .. }))
        ));
        assert!(s.current().is_none());
        assert_eq!(s.kernel().unwrap().solid_count(), 0);

        let mut fallback: HornSession<MockKernel> = HornSession::new(None, config);
        assert!(matches!(
            fallback.generate(&inputs()),
            Err(EngineError::Op(OpError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn kernel_failure_falls_back_to_lathe() {
        let mut s = session(Some(MockKernel::failing_at(MockFailure::Revolve)));
        let generation = s.generate(&inputs()).unwrap();
        assert_eq!(generation.source, MeshSource::DirectLathe);
        assert!(!generation.has_solid());
    }

    #[test]
    fn display_requires_a_generation() {
        let mut s = session(None);
        let mut sink = RecordingSink::default();
        assert!(matches!(s.display(&mut sink), Err(EngineError::NoCurrentShape)));

        s.generate(&inputs()).unwrap();
        s.display(&mut sink).unwrap();
        assert_eq!(sink.shown.len(), 1);
        assert_eq!(sink.shown[0].0, 8 * 64 * 2);
    }

    #[test]
    fn auto_export_prefers_native() {
        let mut s = session(Some(MockKernel::new()));
        s.generate(&inputs()).unwrap();
        let exported = s.export(ExportRoute::Auto).unwrap();
        assert_eq!(exported.route, ExportRoute::Native);
        assert!(!parse_binary_stl(&exported.bytes).unwrap().is_empty());
    }

    #[test]
    fn auto_export_without_kernel_is_ascii() {
        let mut s = session(None);
        s.generate(&inputs()).unwrap();
        let exported = s.export(ExportRoute::Auto).unwrap();
        assert_eq!(exported.route, ExportRoute::Ascii);

        let text = String::from_utf8(exported.bytes).unwrap();
        let facets = parse_ascii_stl(&text).unwrap();
        assert_eq!(facets.len(), s.current().unwrap().mesh.triangle_count());
    }

    #[test]
    fn binary_export_matches_mesh() {
        let mut s = session(None);
        s.generate(&inputs()).unwrap();
        let exported = s.export(ExportRoute::Binary).unwrap();
        let facets = parse_binary_stl(&exported.bytes).unwrap();
        assert_eq!(facets.len(), s.current().unwrap().mesh.triangle_count());
    }

    #[test]
    fn native_export_errors_surface() {
        let mut s = session(None);
        s.generate(&inputs()).unwrap();
        assert!(matches!(
            s.export(ExportRoute::Native),
            Err(EngineError::Export(ExportError::KernelExport(_)))
        ));

        let mut s = session(Some(MockKernel::failing_at(MockFailure::Export)));
        s.generate(&inputs()).unwrap();
        assert!(matches!(
            s.export(ExportRoute::Native),
            Err(EngineError::Export(ExportError::KernelExport(_)))
        ));
        assert!(matches!(s.export(ExportRoute::Auto), Err(EngineError::Export(_))));
    }

    fn facet_volume(facets: &[StlFacet]) -> f64 {
        let vertices: Vec<f32> = facets
            .iter()
            .flat_map(|f| f.vertices.iter().flatten().copied())
            .collect();
        let indices: Vec<u32> = (0..vertices.len() as u32 / 3).collect();
        signed_volume(&vertices, &indices)
    }

    #[test]
    fn native_and_mesh_exports_face_outward() {
        let mut s = HornSession::new(Some(TruckKernel::new()), PipelineConfig::default());
        s.generate(&inputs()).unwrap();
        assert_eq!(s.current().unwrap().source, MeshSource::KernelBacked);

        let native = s.export(ExportRoute::Auto).unwrap();
        assert_eq!(native.route, ExportRoute::Native);
        let native_volume = facet_volume(&parse_binary_stl(&native.bytes).unwrap());

        let binary = s.export(ExportRoute::Binary).unwrap();
        let mesh_volume = facet_volume(&parse_binary_stl(&binary.bytes).unwrap());

        assert!(native_volume > 0.0);
        assert!(mesh_volume > 0.0);
        assert!((native_volume - mesh_volume).abs() < 0.02 * mesh_volume);
    }

    #[test]
    fn export_requires_a_generation() {
        let mut s = session(None);
        assert!(matches!(
            s.export(ExportRoute::Ascii),
            Err(EngineError::NoCurrentShape)
        ));
    }

    #[test]
    fn route_parses_from_flag_text() {
        assert_eq!("native".parse::<ExportRoute>(), Ok(ExportRoute::Native));
        assert_eq!(ExportRoute::Binary.to_string(), "binary");
        assert!("step".parse::<ExportRoute>().is_err());
    }
}

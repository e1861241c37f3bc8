// ABOUTME: Closed set of job kinds across analysis, modeling and conversion services
// ABOUTME: Each kind maps to one static schema table; adding a kind is a data change

use std::fmt;

use super::schema::{JobSchema, OptionSpec, OptionType, SlotSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Objects2D,
    Segmentation2D,
    Segmentation3D,
    SegmentationOrthophoto,
    ChangeDetection,
    ExtractGround,
    /// ContextCapture calibration followed by reconstruction.
    Full,
    Calibration,
    Reconstruction,
    Conversion,
}

impl JobKind {
    pub const ALL: [JobKind; 10] = [
        JobKind::Objects2D,
        JobKind::Segmentation2D,
        JobKind::Segmentation3D,
        JobKind::SegmentationOrthophoto,
        JobKind::ChangeDetection,
        JobKind::ExtractGround,
        JobKind::Full,
        JobKind::Calibration,
        JobKind::Reconstruction,
        JobKind::Conversion,
    ];

    /// The `type` tag used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Objects2D => "objects2D",
            JobKind::Segmentation2D => "segmentation2D",
            JobKind::Segmentation3D => "segmentation3D",
            JobKind::SegmentationOrthophoto => "segmentationOrthophoto",
            JobKind::ChangeDetection => "changeDetection",
            JobKind::ExtractGround => "extractGround",
            JobKind::Full => "Full",
            JobKind::Calibration => "Calibration",
            JobKind::Reconstruction => "Reconstruction",
            JobKind::Conversion => "Conversion",
        }
    }

    pub fn from_type(tag: &str) -> Option<JobKind> {
        JobKind::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn schema(&self) -> &'static JobSchema {
        match self {
            JobKind::Objects2D => &OBJECTS_2D,
            JobKind::Segmentation2D => &SEGMENTATION_2D,
            JobKind::Segmentation3D => &SEGMENTATION_3D,
            JobKind::SegmentationOrthophoto => &SEGMENTATION_ORTHOPHOTO,
            JobKind::ChangeDetection => &CHANGE_DETECTION,
            JobKind::ExtractGround => &EXTRACT_GROUND,
            JobKind::Full | JobKind::Reconstruction => &MODELING,
            JobKind::Calibration => &CALIBRATION,
            JobKind::Conversion => &CONVERSION,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use OptionType::{Bool, Float, Int, Text};

const fn s(name: &'static str) -> SlotSpec {
    SlotSpec::single(name)
}

const fn opt(name: &'static str, ty: OptionType) -> OptionSpec {
    OptionSpec::new(name, ty)
}

static OBJECTS_2D: JobSchema = JobSchema {
    inputs: &[
        s("photos"),
        s("photoObjectDetector"),
        s("meshes"),
        s("objects2D"),
    ],
    outputs: &[
        s("objects2D"),
        s("objects3D"),
        s("exportedObjects3DDGN"),
        s("exportedObjects3DCesium"),
        s("exportedObjects3DGeoJSON"),
        s("exportedLocations3DSHP"),
        s("exportedLocations3DGeoJSON"),
    ],
    options: &[
        opt("useTiePoints", Bool),
        opt("minPhotos", Int),
        opt("maxDist", Float),
        opt("exportSrs", Text),
    ],
};

static SEGMENTATION_2D: JobSchema = JobSchema {
    inputs: &[
        s("photos"),
        s("photoSegmentationDetector"),
        s("meshes"),
        s("segmentation2D"),
    ],
    outputs: &[
        s("segmentation2D"),
        s("segmentedPhotos"),
        s("lines3D"),
        s("exportedLines3DDGN"),
        s("exportedLines3DCesium"),
        s("exportedLines3DGeoJSON"),
        s("polygons3D"),
        s("exportedPolygons3DDGN"),
        s("exportedPolygons3DCesium"),
        s("exportedPolygons3DGeoJSON"),
    ],
    options: &[
        opt("computeLineWidth", Bool),
        opt("removeSmallComponents", Float),
        opt("exportSrs", Text),
        opt("minPhotos", Int),
    ],
};

static SEGMENTATION_ORTHOPHOTO: JobSchema = JobSchema {
    inputs: &[s("orthophoto"), s("orthophotoSegmentationDetector")],
    outputs: &[
        s("segmentation2D"),
        s("segmentedPhotos"),
        s("polygons2D"),
        s("exportedPolygons2DSHP"),
        s("exportedPolygons2DGeoJSON"),
        s("lines2D"),
        s("exportedLines2DSHP"),
        s("exportedLines2DGeoJSON"),
    ],
    options: &[],
};

static SEGMENTATION_3D: JobSchema = JobSchema {
    inputs: &[
        s("pointClouds"),
        s("meshes"),
        s("pointCloudSegmentationDetector"),
        s("segmentation3D"),
        s("clipPolygon"),
    ],
    outputs: &[
        s("segmentation3D"),
        s("segmentedPointCloud"),
        s("objects3D"),
        s("exportedObjects3DDGN"),
        s("exportedObjects3DCesium"),
        s("exportedObjects3DGeoJSON"),
        s("exportedLocations3DSHP"),
        s("exportedLocations3DGeoJSON"),
        s("exportedSegmentation3DPOD"),
        s("exportedSegmentation3DLAS"),
        s("exportedSegmentation3DLAZ"),
        s("exportedSegmentation3DPLY"),
        s("lines3D"),
        s("exportedLines3DDGN"),
        s("exportedLines3DCesium"),
        s("exportedLines3DGeoJSON"),
        s("polygons3D"),
        s("exportedPolygons3DDGN"),
        s("exportedPolygons3DCesium"),
        s("exportedPolygons3DGeoJSON"),
    ],
    options: &[
        opt("saveConfidence", Bool),
        opt("exportSrs", Text),
        opt("computeLineWidth", Bool),
        opt("removeSmallComponents", Float),
    ],
};

static CHANGE_DETECTION: JobSchema = JobSchema {
    inputs: &[
        s("pointClouds1"),
        s("pointClouds2"),
        s("meshes1"),
        s("meshes2"),
    ],
    outputs: &[
        s("objects3D"),
        s("exportedLocations3DSHP"),
        s("exportedLocations3DGeoJSON"),
    ],
    options: &[
        opt("colorThresholdLow", Float),
        opt("colorThresholdHigh", Float),
        opt("distThresholdLow", Float),
        opt("distThresholdHigh", Float),
        opt("resolution", Float),
        opt("minPoints", Int),
        opt("exportSrs", Text),
    ],
};

static EXTRACT_GROUND: JobSchema = JobSchema {
    inputs: &[
        s("pointClouds"),
        s("meshes"),
        s("pointCloudSegmentationDetector"),
        s("clipPolygon"),
    ],
    outputs: &[
        s("segmentation3D"),
        s("segmentedPointCloud"),
        s("exportedSegmentation3DPOD"),
        s("exportedSegmentation3DLAS"),
        s("exportedSegmentation3DLAZ"),
        s("exportedSegmentation3DPLY"),
    ],
    options: &[opt("exportSrs", Text)],
};

const MODELING_OPTIONS: &[OptionSpec] = &[
    opt("meshQuality", Text),
    opt("processingEngines", Int),
    opt("cacheSettings.createCache", Bool),
    opt("cacheSettings.useCache", Text),
];

static MODELING: JobSchema = JobSchema {
    inputs: &[SlotSpec::many("realityData")],
    outputs: &[
        s("CCOrientations"),
        s("3MX"),
        s("3SM"),
        s("WebReady ScalableMesh"),
        s("Cesium 3D Tiles"),
        s("POD"),
        s("Orthophoto/DSM"),
        s("LAS"),
        s("FBX"),
        s("OBJ"),
        s("ESRI i3s"),
        s("DGN"),
        s("LodTree"),
        s("OPC"),
    ],
    options: MODELING_OPTIONS,
};

static CALIBRATION: JobSchema = JobSchema {
    inputs: &[SlotSpec::many("realityData")],
    outputs: &[s("CCOrientations")],
    options: MODELING_OPTIONS,
};

static CONVERSION: JobSchema = JobSchema {
    inputs: &[
        SlotSpec::many("LAS"),
        SlotSpec::many("LAZ"),
        SlotSpec::many("PLY"),
        SlotSpec::many("E57"),
    ],
    outputs: &[s("OPC"), s("PNTS")],
    options: &[opt("processingEngines", Int), opt("merge", Bool)],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_tags_roundtrip() {
        for kind in JobKind::ALL {
            assert_eq!(JobKind::from_type(kind.as_str()), Some(kind));
        }
        assert_eq!(JobKind::from_type("invalidJobType"), None);
        assert_eq!(JobKind::from_type("Objects2D"), None);
    }

    #[test]
    fn test_schemas_have_unique_names() {
        for kind in JobKind::ALL {
            let schema = kind.schema();
            let inputs: HashSet<_> = schema.inputs.iter().map(|s| s.name).collect();
            let outputs: HashSet<_> = schema.outputs.iter().map(|s| s.name).collect();
            let options: HashSet<_> = schema.options.iter().map(|o| o.name).collect();
            assert_eq!(inputs.len(), schema.inputs.len(), "{}", kind);
            assert_eq!(outputs.len(), schema.outputs.len(), "{}", kind);
            assert_eq!(options.len(), schema.options.len(), "{}", kind);
        }
    }

    #[test]
    fn test_calibration_only_produces_orientations() {
        let outputs: Vec<_> = JobKind::Calibration
            .schema()
            .outputs
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(outputs, vec!["CCOrientations"]);
        assert!(JobKind::Reconstruction.schema().output("3MX").is_some());
    }
}

// ABOUTME: Service generations: which job kinds each serves and its wire convention
// ABOUTME: Also fixes per-service base URL, Accept header and owner key

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{DescriptorKeys, OptionEncoding, OptionsPlacement, Section, WireConvention};
use crate::error::{RealityError, Result};
use crate::settings::JobKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    /// Reality Data Analysis, `{type, id}` descriptors at the job root.
    AnalysisV1,
    /// Reality Data Analysis, `{name, realityDataId}` under `settings`.
    AnalysisV2,
    /// ContextCapture modeling.
    Modeling,
    /// Reality Conversion.
    Conversion,
}

const ANALYSIS_KINDS: &[JobKind] = &[
    JobKind::Objects2D,
    JobKind::Segmentation2D,
    JobKind::Segmentation3D,
    JobKind::SegmentationOrthophoto,
    JobKind::ChangeDetection,
    JobKind::ExtractGround,
];

const MODELING_KINDS: &[JobKind] = &[JobKind::Full, JobKind::Calibration, JobKind::Reconstruction];

const CONVERSION_KINDS: &[JobKind] = &[JobKind::Conversion];

const TYPE_ID: DescriptorKeys = DescriptorKeys {
    tag: Some("type"),
    id: "id",
};

static ANALYSIS_V1: WireConvention = WireConvention {
    inputs: TYPE_ID,
    outputs: TYPE_ID,
    inputs_in: Section::Root,
    outputs_in: Section::Root,
    options_in: Section::Root,
    options: OptionsPlacement::Object("options"),
    encoding: OptionEncoding::Strings,
};

static ANALYSIS_V2: WireConvention = WireConvention {
    inputs: DescriptorKeys {
        tag: Some("name"),
        id: "realityDataId",
    },
    outputs: DescriptorKeys {
        tag: Some("name"),
        id: "realityDataId",
    },
    inputs_in: Section::Settings,
    outputs_in: Section::Settings,
    options_in: Section::Settings,
    options: OptionsPlacement::Object("options"),
    encoding: OptionEncoding::Strings,
};

static MODELING: WireConvention = WireConvention {
    inputs: DescriptorKeys { tag: None, id: "id" },
    outputs: DescriptorKeys {
        tag: Some("format"),
        id: "id",
    },
    inputs_in: Section::Root,
    outputs_in: Section::Settings,
    options_in: Section::Settings,
    options: OptionsPlacement::Inline,
    encoding: OptionEncoding::Native,
};

static CONVERSION: WireConvention = WireConvention {
    inputs: TYPE_ID,
    outputs: TYPE_ID,
    inputs_in: Section::Root,
    outputs_in: Section::Root,
    options_in: Section::Root,
    options: OptionsPlacement::Object("options"),
    encoding: OptionEncoding::Native,
};

impl Service {
    pub const ALL: [Service; 4] = [
        Service::AnalysisV1,
        Service::AnalysisV2,
        Service::Modeling,
        Service::Conversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::AnalysisV1 => "analysis-v1",
            Service::AnalysisV2 => "analysis-v2",
            Service::Modeling => "modeling",
            Service::Conversion => "conversion",
        }
    }

    pub fn job_kinds(&self) -> &'static [JobKind] {
        match self {
            Service::AnalysisV1 | Service::AnalysisV2 => ANALYSIS_KINDS,
            Service::Modeling => MODELING_KINDS,
            Service::Conversion => CONVERSION_KINDS,
        }
    }

    pub fn supports(&self, kind: JobKind) -> bool {
        self.job_kinds().contains(&kind)
    }

    /// The single dispatch point from a raw `type` tag to a job kind.
    pub fn parse_job_kind(&self, tag: &str) -> Result<JobKind> {
        JobKind::from_type(tag)
            .filter(|kind| self.supports(*kind))
            .ok_or_else(|| RealityError::UnknownJobKind(tag.to_string()))
    }

    pub fn convention(&self) -> &'static WireConvention {
        match self {
            Service::AnalysisV1 => &ANALYSIS_V1,
            Service::AnalysisV2 => &ANALYSIS_V2,
            Service::Modeling => &MODELING,
            Service::Conversion => &CONVERSION,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Service::AnalysisV1 | Service::AnalysisV2 => {
                "https://api.bentley.com/realitydataanalysis"
            }
            Service::Modeling => "https://api.bentley.com/contextcapture",
            Service::Conversion => "https://api.bentley.com/realityconversion",
        }
    }

    pub fn accept_header(&self) -> &'static str {
        match self {
            Service::AnalysisV2 => "application/vnd.bentley.itwin-platform.v2+json",
            _ => "application/vnd.bentley.itwin-platform.v1+json",
        }
    }

    /// Key naming the owning tenant in creation bodies.
    pub fn owner_key(&self) -> &'static str {
        match self {
            Service::Modeling => "workspaceId",
            _ => "iTwinId",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = RealityError;

    fn from_str(s: &str) -> Result<Self> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| RealityError::malformed(format!("unknown service '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_served_exactly_once_per_family() {
        for kind in JobKind::ALL {
            let serving: Vec<_> = [Service::AnalysisV1, Service::Modeling, Service::Conversion]
                .into_iter()
                .filter(|s| s.supports(kind))
                .collect();
            assert_eq!(serving.len(), 1, "{}", kind);
        }
        assert_eq!(
            Service::AnalysisV1.job_kinds(),
            Service::AnalysisV2.job_kinds()
        );
    }

    #[test]
    fn test_parse_job_kind_is_scoped_to_service() {
        assert_eq!(
            Service::Modeling.parse_job_kind("Calibration").unwrap(),
            JobKind::Calibration
        );
        let err = Service::Modeling.parse_job_kind("objects2D").unwrap_err();
        assert_eq!(err, RealityError::UnknownJobKind("objects2D".to_string()));
    }

    #[test]
    fn test_service_names_roundtrip() {
        for service in Service::ALL {
            assert_eq!(service.as_str().parse::<Service>().unwrap(), service);
        }
        assert!("analysis".parse::<Service>().is_err());
    }
}

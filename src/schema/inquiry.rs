//! Inquiry metrics: the single-entry-point metadata probe catalog.
//!
//! Call sites that sweep file metadata probe dozens of metrics in a loop and
//! expect unknown names to come back as a sentinel rather than an error, so
//! token parsing never fails: an unrecognized token maps to
//! [`Inquiry::Invalid`], and inquiring it yields [`InquiryValue::Invalid`].

use serde::{Deserialize, Serialize};

/// Named global metrics answerable by [`Store::inquire`].
///
/// [`Store::inquire`]: crate::store::Store::inquire
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inquiry {
    ApiVersion,
    DbVersion,
    LibVersion,
    Dimension,
    Nodes,
    Elements,
    ElementBlocks,
    NodeSets,
    NodeSetNodeLength,
    NodeSetDistFactLength,
    SideSets,
    SideSetElementLength,
    SideSetNodeLength,
    SideSetDistFactLength,
    QaRecords,
    InfoRecords,
    TimeSteps,
    ElementBlockProperties,
    NodeSetProperties,
    SideSetProperties,
    ElementMapProperties,
    NodeMapProperties,
    ElementMaps,
    NodeMaps,
    EdgeMaps,
    FaceMaps,
    Edges,
    EdgeBlocks,
    EdgeSets,
    EdgeSetLength,
    EdgeSetDistFactLength,
    EdgeBlockProperties,
    EdgeSetProperties,
    Faces,
    FaceBlocks,
    FaceSets,
    FaceSetLength,
    FaceSetDistFactLength,
    FaceBlockProperties,
    FaceSetProperties,
    ElementSets,
    ElementSetLength,
    ElementSetDistFactLength,
    ElementSetProperties,
    Assemblies,
    DbMaxAllowedNameLength,
    DbMaxUsedNameLength,
    MaxReadNameLength,
    DbFloatSize,
    /// Sentinel for unrecognized tokens; inquiring it is not an error.
    Invalid,
}

impl Inquiry {
    /// Parses a historic inquiry token.
    ///
    /// Unknown tokens parse to [`Inquiry::Invalid`] so that bulk probe
    /// loops degrade gracefully instead of aborting.
    pub fn from_token(token: &str) -> Self {
        match token {
            "EX_INQ_API_VERS" => Inquiry::ApiVersion,
            "EX_INQ_DB_VERS" => Inquiry::DbVersion,
            "EX_INQ_LIB_VERS" => Inquiry::LibVersion,
            "EX_INQ_DIM" => Inquiry::Dimension,
            "EX_INQ_NODES" => Inquiry::Nodes,
            "EX_INQ_ELEM" => Inquiry::Elements,
            "EX_INQ_ELEM_BLK" => Inquiry::ElementBlocks,
            "EX_INQ_NODE_SETS" => Inquiry::NodeSets,
            "EX_INQ_NS_NODE_LEN" => Inquiry::NodeSetNodeLength,
            "EX_INQ_NS_DF_LEN" => Inquiry::NodeSetDistFactLength,
            "EX_INQ_SIDE_SETS" => Inquiry::SideSets,
            "EX_INQ_SS_ELEM_LEN" => Inquiry::SideSetElementLength,
            "EX_INQ_SS_NODE_LEN" => Inquiry::SideSetNodeLength,
            "EX_INQ_SS_DF_LEN" => Inquiry::SideSetDistFactLength,
            "EX_INQ_QA" => Inquiry::QaRecords,
            "EX_INQ_INFO" => Inquiry::InfoRecords,
            "EX_INQ_TIME" => Inquiry::TimeSteps,
            "EX_INQ_EB_PROP" => Inquiry::ElementBlockProperties,
            "EX_INQ_NS_PROP" => Inquiry::NodeSetProperties,
            "EX_INQ_SS_PROP" => Inquiry::SideSetProperties,
            "EX_INQ_EM_PROP" => Inquiry::ElementMapProperties,
            "EX_INQ_NM_PROP" => Inquiry::NodeMapProperties,
            "EX_INQ_ELEM_MAP" => Inquiry::ElementMaps,
            "EX_INQ_NODE_MAP" => Inquiry::NodeMaps,
            "EX_INQ_EDGE_MAP" => Inquiry::EdgeMaps,
            "EX_INQ_FACE_MAP" => Inquiry::FaceMaps,
            "EX_INQ_EDGE" => Inquiry::Edges,
            "EX_INQ_EDGE_BLK" => Inquiry::EdgeBlocks,
            "EX_INQ_EDGE_SETS" => Inquiry::EdgeSets,
            "EX_INQ_ES_LEN" => Inquiry::EdgeSetLength,
            "EX_INQ_ES_DF_LEN" => Inquiry::EdgeSetDistFactLength,
            "EX_INQ_EDGE_PROP" => Inquiry::EdgeBlockProperties,
            "EX_INQ_ES_PROP" => Inquiry::EdgeSetProperties,
            "EX_INQ_FACE" => Inquiry::Faces,
            "EX_INQ_FACE_BLK" => Inquiry::FaceBlocks,
            "EX_INQ_FACE_SETS" => Inquiry::FaceSets,
            "EX_INQ_FS_LEN" => Inquiry::FaceSetLength,
            "EX_INQ_FS_DF_LEN" => Inquiry::FaceSetDistFactLength,
            "EX_INQ_FACE_PROP" => Inquiry::FaceBlockProperties,
            "EX_INQ_FS_PROP" => Inquiry::FaceSetProperties,
            "EX_INQ_ELEM_SETS" => Inquiry::ElementSets,
            "EX_INQ_ELS_LEN" => Inquiry::ElementSetLength,
            "EX_INQ_ELS_DF_LEN" => Inquiry::ElementSetDistFactLength,
            "EX_INQ_ELS_PROP" => Inquiry::ElementSetProperties,
            "EX_INQ_ASSEMBLY" => Inquiry::Assemblies,
            "EX_INQ_DB_MAX_ALLOWED_NAME_LENGTH" => Inquiry::DbMaxAllowedNameLength,
            "EX_INQ_DB_MAX_USED_NAME_LENGTH" => Inquiry::DbMaxUsedNameLength,
            "EX_INQ_MAX_READ_NAME_LENGTH" => Inquiry::MaxReadNameLength,
            "EX_INQ_DB_FLOAT_SIZE" => Inquiry::DbFloatSize,
            _ => Inquiry::Invalid,
        }
    }
}

/// Result of one inquiry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InquiryValue {
    Int(i64),
    Float(f64),
    /// Sentinel for an unanswerable metric; mirrors the historic catch-all
    /// "invalid inquiry" code.
    Invalid,
}

impl InquiryValue {
    /// Integer view; `None` for floats and the sentinel.
    #[inline]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            InquiryValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Float view, widening integers.
    #[inline]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            InquiryValue::Int(v) => Some(v as f64),
            InquiryValue::Float(v) => Some(v),
            InquiryValue::Invalid => None,
        }
    }
}

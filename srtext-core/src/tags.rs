// srtext-core/src/tags.rs
//! Attribute identity: numeric tags, keywords and value representations.
//!
//! A field can be addressed either by its numeric tag or by its keyword. Both
//! addressing schemes are views over the single [`Keyword`] enum, and the two
//! lookup tables are built once on first use.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::SrTextError;

/// A `(group, element)` attribute tag packed into 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u32);

impl Tag {
    pub const fn new(group: u16, element: u16) -> Self {
        Tag(((group as u32) << 16) | element as u32)
    }

    pub const fn group(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub const fn element(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Vendor extensions live in odd groups.
    pub const fn is_private(self) -> bool {
        self.group() % 2 == 1
    }

    pub const fn is_group_length(self) -> bool {
        self.element() == 0
    }

    /// Upper-case eight-digit hex, the key form used by the DICOM JSON model.
    pub fn to_hex(self) -> String {
        format!("{:08X}", self.0)
    }

    pub fn keyword(self) -> Option<Keyword> {
        Keyword::from_tag(self)
    }

    /// The keyword when the dictionary has one, else the hex form.
    pub fn label(self) -> String {
        match self.keyword() {
            Some(keyword) => keyword.name().to_string(),
            None => self.to_hex(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group(), self.element())
    }
}

impl FromStr for Tag {
    type Err = SrTextError;

    /// Accepts `0040A160`, `(0040,A160)` or a known keyword.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | ',' | ' '))
            .collect();
        if compact.len() == 8 && compact.chars().all(|c| c.is_ascii_hexdigit()) {
            return u32::from_str_radix(&compact, 16)
                .map(Tag)
                .map_err(|e| SrTextError::InvalidDocument(format!("bad tag '{}': {}", s, e)));
        }
        Keyword::from_name(s)
            .map(Keyword::tag)
            .ok_or_else(|| SrTextError::UnknownKeyword(s.to_string()))
    }
}

/// The kind of content a field carries, as far as extraction and redaction care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatClass {
    ShortCode,
    LongText,
    Sequence,
    PersonName,
    Date,
    UniqueIdentifier,
    FreeText,
    Numeric,
    Other,
}

macro_rules! value_representations {
    ($($vr:ident),+ $(,)?) => {
        /// DICOM value representation codes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Vr {
            $($vr),+
        }

        impl Vr {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Vr::$vr => stringify!($vr)),+
                }
            }

            pub fn parse(code: &str) -> Option<Vr> {
                match code {
                    $(stringify!($vr) => Some(Vr::$vr),)+
                    _ => None,
                }
            }
        }
    };
}

value_representations!(
    AE, AS, AT, CS, DA, DS, DT, FD, FL, IS, LO, LT, OB, OD, OF, OL, OV, OW, PN, SH, SL, SQ,
    SS, ST, SV, TM, UC, UI, UL, UN, UR, US, UT, UV,
);

impl Vr {
    pub fn format_class(self) -> FormatClass {
        use Vr::*;
        match self {
            SH | CS | AE => FormatClass::ShortCode,
            LO | LT | ST => FormatClass::LongText,
            SQ => FormatClass::Sequence,
            PN => FormatClass::PersonName,
            DA | DT => FormatClass::Date,
            UI => FormatClass::UniqueIdentifier,
            UT | UC | UR => FormatClass::FreeText,
            DS | IS | US | UL | SS | SL | FL | FD | SV | UV => FormatClass::Numeric,
            _ => FormatClass::Other,
        }
    }

    /// Restricted-alphabet VRs are overwritten with the digit filler.
    pub fn uses_digit_fill(self) -> bool {
        matches!(
            self,
            Vr::AS | Vr::CS | Vr::DA | Vr::DS | Vr::DT | Vr::IS | Vr::TM | Vr::UI
        )
    }

    /// VRs whose DICOM JSON `Value` entries are JSON numbers.
    pub fn is_json_number(self) -> bool {
        matches!(
            self,
            Vr::DS | Vr::IS | Vr::US | Vr::UL | Vr::SS | Vr::SL | Vr::FL | Vr::FD | Vr::SV | Vr::UV
        )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Vr::OB | Vr::OD | Vr::OF | Vr::OL | Vr::OV | Vr::OW | Vr::UN
        )
    }
}

impl fmt::Display for Vr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! keywords {
    ($(($name:ident, $group:literal, $element:literal, $vr:ident)),+ $(,)?) => {
        /// Every attribute the crate knows by name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($name),+
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[$(Keyword::$name),+];

            pub const fn tag(self) -> Tag {
                match self {
                    $(Keyword::$name => Tag::new($group, $element)),+
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Keyword::$name => stringify!($name)),+
                }
            }

            pub const fn vr(self) -> Vr {
                match self {
                    $(Keyword::$name => Vr::$vr),+
                }
            }
        }
    };
}

keywords!(
    (SpecificCharacterSet, 0x0008, 0x0005, CS),
    (ImageType, 0x0008, 0x0008, CS),
    (InstanceCreationDate, 0x0008, 0x0012, DA),
    (InstanceCreationTime, 0x0008, 0x0013, TM),
    (InstanceCreatorUID, 0x0008, 0x0014, UI),
    (SOPClassUID, 0x0008, 0x0016, UI),
    (SOPInstanceUID, 0x0008, 0x0018, UI),
    (StudyDate, 0x0008, 0x0020, DA),
    (SeriesDate, 0x0008, 0x0021, DA),
    (AcquisitionDate, 0x0008, 0x0022, DA),
    (ContentDate, 0x0008, 0x0023, DA),
    (AcquisitionDateTime, 0x0008, 0x002A, DT),
    (StudyTime, 0x0008, 0x0030, TM),
    (SeriesTime, 0x0008, 0x0031, TM),
    (AcquisitionTime, 0x0008, 0x0032, TM),
    (ContentTime, 0x0008, 0x0033, TM),
    (AccessionNumber, 0x0008, 0x0050, SH),
    (QueryRetrieveLevel, 0x0008, 0x0052, CS),
    (Modality, 0x0008, 0x0060, CS),
    (ModalitiesInStudy, 0x0008, 0x0061, CS),
    (ConversionType, 0x0008, 0x0064, CS),
    (PresentationIntentType, 0x0008, 0x0068, CS),
    (Manufacturer, 0x0008, 0x0070, LO),
    (InstitutionName, 0x0008, 0x0080, LO),
    (InstitutionAddress, 0x0008, 0x0081, ST),
    (ReferringPhysicianName, 0x0008, 0x0090, PN),
    (CodeValue, 0x0008, 0x0100, SH),
    (CodingSchemeDesignator, 0x0008, 0x0102, SH),
    (CodeMeaning, 0x0008, 0x0104, LO),
    (MappingResource, 0x0008, 0x0105, CS),
    (CodingSchemeIdentificationSequence, 0x0008, 0x0110, SQ),
    (StationName, 0x0008, 0x1010, SH),
    (StudyDescription, 0x0008, 0x1030, LO),
    (ProcedureCodeSequence, 0x0008, 0x1032, SQ),
    (SeriesDescription, 0x0008, 0x103E, LO),
    (InstitutionalDepartmentName, 0x0008, 0x1040, LO),
    (PhysiciansOfRecord, 0x0008, 0x1048, PN),
    (PerformingPhysicianName, 0x0008, 0x1050, PN),
    (NameOfPhysiciansReadingStudy, 0x0008, 0x1060, PN),
    (OperatorsName, 0x0008, 0x1070, PN),
    (AdmittingDiagnosesDescription, 0x0008, 0x1080, LO),
    (ManufacturerModelName, 0x0008, 0x1090, LO),
    (ReferencedStudySequence, 0x0008, 0x1110, SQ),
    (ReferencedPerformedProcedureStepSequence, 0x0008, 0x1111, SQ),
    (ReferencedPatientSequence, 0x0008, 0x1120, SQ),
    (ReferencedSOPClassUID, 0x0008, 0x1150, UI),
    (ReferencedSOPInstanceUID, 0x0008, 0x1155, UI),
    (ReferencedSOPSequence, 0x0008, 0x1199, SQ),
    (DerivationDescription, 0x0008, 0x2111, ST),
    (PatientName, 0x0010, 0x0010, PN),
    (PatientID, 0x0010, 0x0020, LO),
    (IssuerOfPatientID, 0x0010, 0x0021, LO),
    (TypeOfPatientID, 0x0010, 0x0022, CS),
    (PatientBirthDate, 0x0010, 0x0030, DA),
    (PatientBirthTime, 0x0010, 0x0032, TM),
    (PatientSex, 0x0010, 0x0040, CS),
    (PatientInsurancePlanCodeSequence, 0x0010, 0x0050, SQ),
    (OtherPatientIDs, 0x0010, 0x1000, LO),
    (OtherPatientNames, 0x0010, 0x1001, PN),
    (OtherPatientIDsSequence, 0x0010, 0x1002, SQ),
    (PatientBirthName, 0x0010, 0x1005, PN),
    (PatientAge, 0x0010, 0x1010, AS),
    (PatientSize, 0x0010, 0x1020, DS),
    (PatientWeight, 0x0010, 0x1030, DS),
    (PatientAddress, 0x0010, 0x1040, LO),
    (PatientMotherBirthName, 0x0010, 0x1060, PN),
    (MilitaryRank, 0x0010, 0x1080, LO),
    (BranchOfService, 0x0010, 0x1081, LO),
    (MedicalRecordLocator, 0x0010, 0x1090, LO),
    (MedicalAlerts, 0x0010, 0x2000, LO),
    (Allergies, 0x0010, 0x2110, LO),
    (CountryOfResidence, 0x0010, 0x2150, LO),
    (RegionOfResidence, 0x0010, 0x2152, LO),
    (PatientTelephoneNumbers, 0x0010, 0x2154, SH),
    (EthnicGroup, 0x0010, 0x2160, SH),
    (Occupation, 0x0010, 0x2180, SH),
    (SmokingStatus, 0x0010, 0x21A0, CS),
    (AdditionalPatientHistory, 0x0010, 0x21B0, LT),
    (PregnancyStatus, 0x0010, 0x21C0, US),
    (LastMenstrualDate, 0x0010, 0x21D0, DA),
    (PatientReligiousPreference, 0x0010, 0x21F0, LO),
    (PatientComments, 0x0010, 0x4000, LT),
    (ContrastBolusAgent, 0x0018, 0x0010, LO),
    (BodyPartExamined, 0x0018, 0x0015, CS),
    (CineRate, 0x0018, 0x0040, IS),
    (CountsAccumulated, 0x0018, 0x0070, IS),
    (DeviceSerialNumber, 0x0018, 0x1000, LO),
    (DateOfSecondaryCapture, 0x0018, 0x1012, DA),
    (TimeOfSecondaryCapture, 0x0018, 0x1014, TM),
    (SecondaryCaptureDeviceManufacturer, 0x0018, 0x1016, LO),
    (SecondaryCaptureDeviceManufacturerModelName, 0x0018, 0x1018, LO),
    (SecondaryCaptureDeviceSoftwareVersions, 0x0018, 0x1019, LO),
    (SoftwareVersions, 0x0018, 0x1020, LO),
    (ProtocolName, 0x0018, 0x1030, LO),
    (ContrastBolusStartTime, 0x0018, 0x1042, TM),
    (SpatialResolution, 0x0018, 0x1050, DS),
    (FrameTime, 0x0018, 0x1063, DS),
    (HeartRate, 0x0018, 0x1088, IS),
    (DistanceSourceToDetector, 0x0018, 0x1110, DS),
    (DistanceSourceToPatient, 0x0018, 0x1111, DS),
    (FieldOfViewShape, 0x0018, 0x1147, CS),
    (FieldOfViewDimensions, 0x0018, 0x1149, IS),
    (ExposureTime, 0x0018, 0x1150, IS),
    (Exposure, 0x0018, 0x1152, IS),
    (ExposureInuAs, 0x0018, 0x1153, IS),
    (FilterType, 0x0018, 0x1160, SH),
    (ImagerPixelSpacing, 0x0018, 0x1164, DS),
    (Grid, 0x0018, 0x1166, CS),
    (FocalSpots, 0x0018, 0x1190, DS),
    (DateOfLastCalibration, 0x0018, 0x1200, DA),
    (TimeOfLastCalibration, 0x0018, 0x1201, TM),
    (AcquisitionDeviceProcessingDescription, 0x0018, 0x1400, LO),
    (AcquisitionDeviceProcessingCode, 0x0018, 0x1401, LO),
    (ExposureIndex, 0x0018, 0x1411, DS),
    (DeviationIndex, 0x0018, 0x1413, DS),
    (PositionerType, 0x0018, 0x1508, CS),
    (FocusDepth, 0x0018, 0x5012, DS),
    (BoneThermalIndex, 0x0018, 0x5022, DS),
    (DepthOfScanField, 0x0018, 0x5050, IS),
    (DetectorType, 0x0018, 0x7004, CS),
    (DetectorConfiguration, 0x0018, 0x7005, CS),
    (DetectorDescription, 0x0018, 0x7006, LT),
    (DetectorID, 0x0018, 0x700A, SH),
    (DateOfLastDetectorCalibration, 0x0018, 0x700C, DA),
    (DetectorBinning, 0x0018, 0x701A, DS),
    (DetectorActiveShape, 0x0018, 0x7024, CS),
    (DetectorManufacturerName, 0x0018, 0x702A, LO),
    (DetectorManufacturerModelName, 0x0018, 0x702B, LO),
    (ExposureControlMode, 0x0018, 0x7060, CS),
    (ExposureTimeInuS, 0x0018, 0x8150, DS),
    (StudyInstanceUID, 0x0020, 0x000D, UI),
    (SeriesInstanceUID, 0x0020, 0x000E, UI),
    (StudyID, 0x0020, 0x0010, SH),
    (SeriesNumber, 0x0020, 0x0011, IS),
    (AcquisitionNumber, 0x0020, 0x0012, IS),
    (InstanceNumber, 0x0020, 0x0013, IS),
    (PatientOrientation, 0x0020, 0x0020, CS),
    (ImageLaterality, 0x0020, 0x0062, CS),
    (SeriesInStudy, 0x0020, 0x1000, IS),
    (NumberOfStudyRelatedInstances, 0x0020, 0x1208, IS),
    (ImageComments, 0x0020, 0x4000, LT),
    (SamplesPerPixel, 0x0028, 0x0002, US),
    (PhotometricInterpretation, 0x0028, 0x0004, CS),
    (PlanarConfiguration, 0x0028, 0x0006, US),
    (FrameIncrementPointer, 0x0028, 0x0009, AT),
    (Rows, 0x0028, 0x0010, US),
    (Columns, 0x0028, 0x0011, US),
    (PixelSpacing, 0x0028, 0x0030, DS),
    (BitsAllocated, 0x0028, 0x0100, US),
    (BitsStored, 0x0028, 0x0101, US),
    (HighBit, 0x0028, 0x0102, US),
    (PixelRepresentation, 0x0028, 0x0103, US),
    (SmallestImagePixelValue, 0x0028, 0x0106, US),
    (LargestImagePixelValue, 0x0028, 0x0107, US),
    (QualityControlImage, 0x0028, 0x0300, CS),
    (BurnedInAnnotation, 0x0028, 0x0301, CS),
    (PixelIntensityRelationship, 0x0028, 0x1040, CS),
    (PixelIntensityRelationshipSign, 0x0028, 0x1041, SS),
    (WindowCenter, 0x0028, 0x1050, DS),
    (WindowWidth, 0x0028, 0x1051, DS),
    (RescaleIntercept, 0x0028, 0x1052, DS),
    (RescaleSlope, 0x0028, 0x1053, DS),
    (RescaleType, 0x0028, 0x1054, LO),
    (LossyImageCompression, 0x0028, 0x2110, CS),
    (StudyReadDate, 0x0032, 0x0034, DA),
    (StudyReadTime, 0x0032, 0x0035, TM),
    (ScheduledStudyStartDate, 0x0032, 0x1000, DA),
    (ScheduledStudyStartTime, 0x0032, 0x1001, TM),
    (RequestingPhysician, 0x0032, 0x1032, PN),
    (RequestingService, 0x0032, 0x1033, LO),
    (RequestedProcedureDescription, 0x0032, 0x1060, LO),
    (RequestedProcedureCodeSequence, 0x0032, 0x1064, SQ),
    (StudyComments, 0x0032, 0x4000, LT),
    (SpecialNeeds, 0x0038, 0x0050, LO),
    (PatientState, 0x0038, 0x0500, LO),
    (PerformedProcedureStepStartDate, 0x0040, 0x0244, DA),
    (PerformedProcedureStepStartTime, 0x0040, 0x0245, TM),
    (PerformedProcedureStepID, 0x0040, 0x0253, SH),
    (PerformedProcedureStepDescription, 0x0040, 0x0254, LO),
    (PerformedProtocolCodeSequence, 0x0040, 0x0260, SQ),
    (ScheduledStepAttributesSequence, 0x0040, 0x0270, SQ),
    (RequestAttributesSequence, 0x0040, 0x0275, SQ),
    (CommentsOnThePerformedProcedureStep, 0x0040, 0x0280, ST),
    (TotalNumberOfExposures, 0x0040, 0x0301, US),
    (EntranceDose, 0x0040, 0x0302, US),
    (ExposedArea, 0x0040, 0x0303, US),
    (ExposureDoseSequence, 0x0040, 0x030E, SQ),
    (MeasurementUnitsCodeSequence, 0x0040, 0x08EA, SQ),
    (ConfidentialityCode, 0x0040, 0x1008, LO),
    (RequestedProcedureComments, 0x0040, 0x1400, LT),
    (ConfidentialityConstraintOnPatientDataDescription, 0x0040, 0x3001, LO),
    (EntranceDoseInmGy, 0x0040, 0x8302, DS),
    (RelationshipType, 0x0040, 0xA010, CS),
    (VerifyingOrganization, 0x0040, 0xA027, LO),
    (VerificationDateTime, 0x0040, 0xA030, DT),
    (ObservationDateTime, 0x0040, 0xA032, DT),
    (ValueType, 0x0040, 0xA040, CS),
    (ConceptNameCodeSequence, 0x0040, 0xA043, SQ),
    (ContinuityOfContent, 0x0040, 0xA050, CS),
    (VerifyingObserverSequence, 0x0040, 0xA073, SQ),
    (VerifyingObserverName, 0x0040, 0xA075, PN),
    (DateTime, 0x0040, 0xA120, DT),
    (Date, 0x0040, 0xA121, DA),
    (Time, 0x0040, 0xA122, TM),
    (PersonName, 0x0040, 0xA123, PN),
    (UID, 0x0040, 0xA124, UI),
    (TextValue, 0x0040, 0xA160, UT),
    (ConceptCodeSequence, 0x0040, 0xA168, SQ),
    (MeasuredValueSequence, 0x0040, 0xA300, SQ),
    (NumericValue, 0x0040, 0xA30A, DS),
    (PredecessorDocumentsSequence, 0x0040, 0xA360, SQ),
    (ReferencedRequestSequence, 0x0040, 0xA370, SQ),
    (PerformedProcedureCodeSequence, 0x0040, 0xA372, SQ),
    (CurrentRequestedProcedureEvidenceSequence, 0x0040, 0xA375, SQ),
    (CompletionFlag, 0x0040, 0xA491, CS),
    (CompletionFlagDescription, 0x0040, 0xA492, LO),
    (VerificationFlag, 0x0040, 0xA493, CS),
    (ContentTemplateSequence, 0x0040, 0xA504, SQ),
    (ContentSequence, 0x0040, 0xA730, SQ),
    (TemplateIdentifier, 0x0040, 0xDB00, CS),
    (DocumentTitle, 0x0042, 0x0010, ST),
    (EncapsulatedDocument, 0x0042, 0x0011, OB),
    (MIMETypeOfEncapsulatedDocument, 0x0042, 0x0012, LO),
    (StorageMediaFileSetUID, 0x0088, 0x0140, UI),
    (AnnotationDisplayFormatID, 0x2010, 0x0030, CS),
    (FilmOrientation, 0x2010, 0x0040, CS),
    (BorderDensity, 0x2010, 0x0100, CS),
    (PresentationLUTShape, 0x2050, 0x0020, CS),
    (InterpretationStatusID, 0x4008, 0x0212, CS),
    (OverlayRows, 0x6000, 0x0010, US),
    (OverlayColumns, 0x6000, 0x0011, US),
    (OverlayType, 0x6000, 0x0040, CS),
    (OverlaySubtype, 0x6000, 0x0045, LO),
    (OverlayOrigin, 0x6000, 0x0050, SS),
    (OverlayBitsAllocated, 0x6000, 0x0100, US),
    (OverlayBitPosition, 0x6000, 0x0102, US),
    (OverlayData, 0x6000, 0x3000, OW),
    (PixelData, 0x7FE0, 0x0010, OW),
);

static BY_TAG: Lazy<HashMap<Tag, Keyword>> =
    Lazy::new(|| Keyword::ALL.iter().map(|k| (k.tag(), *k)).collect());

static BY_NAME: Lazy<HashMap<&'static str, Keyword>> =
    Lazy::new(|| Keyword::ALL.iter().map(|k| (k.name(), *k)).collect());

impl Keyword {
    pub fn from_tag(tag: Tag) -> Option<Keyword> {
        BY_TAG.get(&tag).copied()
    }

    pub fn from_name(name: &str) -> Option<Keyword> {
        BY_NAME.get(name).copied()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Keyword> for Tag {
    fn from(k: Keyword) -> Tag {
        k.tag()
    }
}

use serde::{Deserialize, Serialize};

/// Student profile merged with the owning account's identity.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub year: Option<String>,
    pub college_name: Option<String>,
}

/// Partial update of a student profile. Name and email update the account itself.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub year: Option<String>,
    pub college_name: Option<String>,
}

/// Admin or event-manager profile merged with the owning account's identity.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffDetails {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[schema(example = "Senior Event Coordinator")]
    pub designation: Option<String>,
    #[schema(example = "+1234567890")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffDetailsRequest {
    pub designation: Option<String>,
    pub phone_number: Option<String>,
}

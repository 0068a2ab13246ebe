use serde::Serialize;

#[derive(Serialize)]
pub struct RegistrationCreatedResponse {
    pub registration_id: String,
    pub queue_status: String,
    pub management_token: String,
}

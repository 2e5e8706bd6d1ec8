use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct SpoolQrResponse {
    pub id: i64,
    pub qr: String,
}

#[derive(Serialize)]
pub struct DecodedQrResponse {
    pub id: i64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn deleted() -> Self {
        Self { status: "deleted" }
    }
}

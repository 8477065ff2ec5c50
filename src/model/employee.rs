use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "1001",
        "name": "Mona Adel",
        "specialty": "Nursing",
        "regular_leave_balance": 21,
        "casual_leave_balance": 7
    })
)]
pub struct Employee {
    #[schema(example = "1001")]
    pub employee_id: String,

    #[schema(example = "Mona Adel")]
    pub name: String,

    #[schema(example = "Nursing", nullable = true)]
    pub specialty: Option<String>,

    #[schema(example = 21)]
    pub regular_leave_balance: i32,

    #[schema(example = 7)]
    pub casual_leave_balance: i32,
}

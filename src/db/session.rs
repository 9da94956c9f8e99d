use sqlx::MySqlConnection;

/// Session-level options applied to every leased connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub sql_mode: String,
    pub time_zone: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sql_mode: "TRADITIONAL".to_string(),
            time_zone: "-08:00".to_string(),
        }
    }
}

impl SessionSettings {
    /// Statements run in order on a freshly leased connection.
    ///
    /// Values are checked by `Config::validate` before they get here.
    pub fn statements(&self) -> [String; 2] {
        [
            format!("SET SESSION sql_mode = '{}'", self.sql_mode),
            format!("SET time_zone = '{}'", self.time_zone),
        ]
    }

    pub async fn apply(&self, conn: &mut MySqlConnection) -> Result<(), sqlx::Error> {
        for statement in self.statements() {
            sqlx::query(&statement).execute(&mut *conn).await?;
        }
        Ok(())
    }
}

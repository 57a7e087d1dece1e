use crate::domain::{models::skill::{Skill, StaffSkill}, ports::SkillRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSkillRepo {
    pool: SqlitePool,
}

impl SqliteSkillRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillRepository for SqliteSkillRepo {
    async fn create(&self, skill: &Skill) -> Result<Skill, AppError> {
        sqlx::query_as::<_, Skill>(
            "INSERT INTO skills (id, tenant_id, skill_name, description, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&skill.id)
            .bind(&skill.tenant_id)
            .bind(&skill.skill_name)
            .bind(&skill.description)
            .bind(skill.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<Skill>, AppError> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<Skill>, AppError> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE tenant_id = ? ORDER BY skill_name ASC")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, skill: &Skill) -> Result<Skill, AppError> {
        sqlx::query_as::<_, Skill>(
            "UPDATE skills SET skill_name = ?, description = ? WHERE tenant_id = ? AND id = ? RETURNING *"
        )
            .bind(&skill.skill_name)
            .bind(&skill.description)
            .bind(&skill.tenant_id)
            .bind(&skill.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM skills WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Skill not found".into()));
        }
        Ok(())
    }

    async fn set_staff_skills(&self, user_id: &str, skill_ids: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM staff_skills WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        for skill_id in skill_ids {
            sqlx::query("INSERT INTO staff_skills (user_id, skill_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(skill_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_staff_skills(&self, tenant_id: &str) -> Result<Vec<StaffSkill>, AppError> {
        sqlx::query_as::<_, StaffSkill>(
            "SELECT ss.user_id, ss.skill_id, s.skill_name
             FROM staff_skills ss JOIN skills s ON s.id = ss.skill_id
             WHERE s.tenant_id = ?
             ORDER BY s.skill_name ASC"
        )
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_skills_for_staff(&self, user_id: &str) -> Result<Vec<StaffSkill>, AppError> {
        sqlx::query_as::<_, StaffSkill>(
            "SELECT ss.user_id, ss.skill_id, s.skill_name
             FROM staff_skills ss JOIN skills s ON s.id = ss.skill_id
             WHERE ss.user_id = ?
             ORDER BY s.skill_name ASC"
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_skill_services(&self, skill_id: &str, service_ids: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM skill_services WHERE skill_id = ?")
            .bind(skill_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        for service_id in service_ids {
            sqlx::query("INSERT INTO skill_services (skill_id, service_id) VALUES (?, ?)")
                .bind(skill_id)
                .bind(service_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_service_ids_for_skill(&self, skill_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT service_id FROM skill_services WHERE skill_id = ? ORDER BY service_id")
            .bind(skill_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_skill_ids_for_service(&self, service_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT skill_id FROM skill_services WHERE service_id = ? ORDER BY skill_id")
            .bind(service_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

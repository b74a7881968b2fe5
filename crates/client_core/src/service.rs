use async_trait::async_trait;
use shared::domain::{NewPerson, Person, PersonId};

use crate::error::ServiceError;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Remote phonebook capability consumed by the controller.
#[async_trait]
pub trait PersonService: Send + Sync {
    async fn fetch_all(&self) -> ServiceResult<Vec<Person>>;
    async fn create(&self, person: NewPerson) -> ServiceResult<Person>;
    async fn update_by_id(&self, id: &PersonId, person: Person) -> ServiceResult<Person>;
    async fn delete_by_id(&self, id: &PersonId) -> ServiceResult<()>;
}

/// Stand-in used when no service has been configured; every call fails.
pub struct MissingPersonService;

#[async_trait]
impl PersonService for MissingPersonService {
    async fn fetch_all(&self) -> ServiceResult<Vec<Person>> {
        Err(ServiceError::transport("phonebook service is not configured"))
    }

    async fn create(&self, _person: NewPerson) -> ServiceResult<Person> {
        Err(ServiceError::transport("phonebook service is not configured"))
    }

    async fn update_by_id(&self, _id: &PersonId, _person: Person) -> ServiceResult<Person> {
        Err(ServiceError::transport("phonebook service is not configured"))
    }

    async fn delete_by_id(&self, _id: &PersonId) -> ServiceResult<()> {
        Err(ServiceError::transport("phonebook service is not configured"))
    }
}

//! Repository implementation for contacts. Every query is scoped by owner.

use diesel::{Connection, prelude::*};

use crate::{
    domain::{
        contact::{Contact, NewContact, UpdateContact},
        types::{ContactId, UserId},
    },
    models::contact::{
        Contact as DbContact, NewContact as DbNewContact, UpdateContact as DbUpdateContact,
    },
    repository::{
        ContactListQuery, ContactReader, ContactWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

/// Case-folds the term and escapes `LIKE` wildcards so it is matched
/// literally against the lower-cased search columns.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn into_domain(contacts: Vec<DbContact>) -> RepositoryResult<Vec<Contact>> {
    contacts
        .into_iter()
        .map(|contact| Contact::try_from(contact).map_err(RepositoryError::from))
        .collect()
}

impl ContactReader for DieselRepository {
    fn get_contact_by_id(
        &self,
        id: ContactId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Contact>> {
        use crate::schema::contacts;

        let mut conn = self.conn()?;
        let db_contact = contacts::table
            .filter(contacts::id.eq(id.get()))
            .filter(contacts::user_id.eq(user_id.get()))
            .select(DbContact::as_select())
            .first(&mut conn)
            .optional()?;

        match db_contact {
            Some(db_contact) => Ok(Some(Contact::try_from(db_contact)?)),
            None => Ok(None),
        }
    }

    fn list_contacts(&self, query: ContactListQuery) -> RepositoryResult<Vec<Contact>> {
        use crate::schema::contacts;

        let mut conn = self.conn()?;

        let mut items = contacts::table
            .filter(contacts::user_id.eq(query.user_id.get()))
            .select(DbContact::as_select())
            .into_boxed();

        if let Some(term) = query.search.as_deref() {
            let pattern = like_pattern(term);
            items = items.filter(
                contacts::name_search
                    .like(pattern.clone())
                    .escape('\\')
                    .or(contacts::surname_search.like(pattern.clone()).escape('\\'))
                    .or(contacts::email.like(pattern).escape('\\')),
            );
        }

        let db_contacts = items
            .order(contacts::id.asc())
            .offset(query.skip)
            .limit(query.limit)
            .load(&mut conn)?;

        into_domain(db_contacts)
    }

    fn list_contacts_with_birthday(&self, user_id: UserId) -> RepositoryResult<Vec<Contact>> {
        use crate::schema::contacts;

        let mut conn = self.conn()?;
        let db_contacts = contacts::table
            .filter(contacts::user_id.eq(user_id.get()))
            .filter(contacts::birthday.is_not_null())
            .order(contacts::id.asc())
            .select(DbContact::as_select())
            .load(&mut conn)?;

        into_domain(db_contacts)
    }
}

impl ContactWriter for DieselRepository {
    fn create_contact(&self, new_contact: &NewContact) -> RepositoryResult<Contact> {
        use crate::schema::contacts;

        let mut conn = self.conn()?;
        let db_new_contact: DbNewContact = new_contact.into();

        let db_contact = diesel::insert_into(contacts::table)
            .values(&db_new_contact)
            .returning(DbContact::as_returning())
            .get_result(&mut conn)?;

        Ok(Contact::try_from(db_contact)?)
    }

    fn update_contact(
        &self,
        id: ContactId,
        user_id: UserId,
        updates: &UpdateContact,
    ) -> RepositoryResult<Option<Contact>> {
        if updates.is_empty() {
            return self.get_contact_by_id(id, user_id);
        }

        use crate::schema::contacts;

        let mut conn = self.conn()?;
        let changeset: DbUpdateContact = updates.into();

        let db_contact = diesel::update(
            contacts::table
                .filter(contacts::id.eq(id.get()))
                .filter(contacts::user_id.eq(user_id.get())),
        )
        .set(&changeset)
        .returning(DbContact::as_returning())
        .get_result(&mut conn)
        .optional()?;

        match db_contact {
            Some(db_contact) => Ok(Some(Contact::try_from(db_contact)?)),
            None => Ok(None),
        }
    }

    fn delete_contact(&self, id: ContactId, user_id: UserId) -> RepositoryResult<Option<Contact>> {
        use crate::schema::contacts;

        let mut conn = self.conn()?;

        let db_contact = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let found = contacts::table
                .filter(contacts::id.eq(id.get()))
                .filter(contacts::user_id.eq(user_id.get()))
                .select(DbContact::as_select())
                .first(conn)
                .optional()?;

            if found.is_some() {
                diesel::delete(contacts::table.filter(contacts::id.eq(id.get()))).execute(conn)?;
            }

            Ok(found)
        })?;

        match db_contact {
            Some(db_contact) => Ok(Some(Contact::try_from(db_contact)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn like_pattern_folds_case() {
        assert_eq!(like_pattern("ОЛЕГ"), "%олег%");
        assert_eq!(like_pattern("Émile"), "%émile%");
    }
}

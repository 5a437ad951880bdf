pub mod filesystem_store;
pub mod memory_store;

#[cfg(test)]
mod test_util {
    use std::error::Error;

    use crate::storage::{
        delete, ListableStorageTraits, ReadableStorageTraits, ReadableWritableListableStorageTraits,
        StorePrefix, WritableStorageTraits,
    };

    /// Create a store with the following data
    /// - a/
    ///   - b [0, 1, 2, 3]
    ///   - c [0]
    ///   - d/
    ///     - e
    ///   - f/
    ///     - g
    ///     - h
    /// - i/
    ///   - j/
    ///     - k [0, 1]
    pub fn store_write<T: WritableStorageTraits>(store: &T) -> Result<(), Box<dyn Error>> {
        store.erase_prefix(&StorePrefix::root())?;

        store.set(&"a/b".try_into()?, vec![255, 255, 255].into())?;
        store.set(&"a/b".try_into()?, vec![0, 1, 2, 3].into())?; // overwrite

        store.set(&"a/c".try_into()?, vec![0].into())?;
        store.set(&"a/d/e".try_into()?, vec![].into())?;
        store.set(&"a/f/g".try_into()?, vec![].into())?;
        store.set(&"a/f/h".try_into()?, vec![].into())?;
        store.set(&"i/j/k".try_into()?, vec![0, 1].into())?;

        store.set(&"erase".try_into()?, vec![].into())?;
        store.erase(&"erase".try_into()?)?;
        store.erase(&"erase".try_into()?)?; // succeeds

        store.set(&"erase_prefix/0".try_into()?, vec![].into())?;
        store.set(&"erase_prefix/1".try_into()?, vec![].into())?;
        store.erase_prefix(&"erase_prefix/".try_into()?)?;
        store.erase_prefix(&"erase_prefix/".try_into()?)?; // succeeds

        Ok(())
    }

    pub fn store_read<T: ReadableStorageTraits>(store: &T) -> Result<(), Box<dyn Error>> {
        assert!(store.get(&"notfound".try_into()?)?.is_none());
        assert!(store.get(&"a/notfound/x".try_into()?)?.is_none());
        // nested under a value
        assert!(store.get(&"a/b/c".try_into()?)?.is_none());
        assert!(store.size_key(&"a/b/c".try_into()?)?.is_none());
        assert!(!store.exists(&"a/b/c".try_into()?)?);
        assert!(store.size_key(&"notfound".try_into()?)?.is_none());
        assert!(!store.exists(&"erase".try_into()?)?);
        assert!(!store.exists(&"erase_prefix/0".try_into()?)?);
        assert_eq!(
            store.get(&"a/b".try_into()?)?,
            Some(vec![0, 1, 2, 3].into())
        );
        assert_eq!(store.get(&"a/d/e".try_into()?)?, Some(vec![].into()));
        assert_eq!(store.size_key(&"a/b".try_into()?)?, Some(4));
        assert_eq!(store.size_key(&"a/c".try_into()?)?, Some(1));
        assert_eq!(store.size_key(&"i/j/k".try_into()?)?, Some(2));
        assert!(store.exists(&"a/d/e".try_into()?)?);
        Ok(())
    }

    pub fn store_list<T: ListableStorageTraits>(store: &T) -> Result<(), Box<dyn Error>> {
        assert_eq!(
            store.list()?,
            &[
                "a/b".try_into()?,
                "a/c".try_into()?,
                "a/d/e".try_into()?,
                "a/f/g".try_into()?,
                "a/f/h".try_into()?,
                "i/j/k".try_into()?
            ]
        );

        assert_eq!(store.list_prefix(&"".try_into()?)?, store.list()?);

        assert_eq!(
            store.list_prefix(&"a/".try_into()?)?,
            &[
                "a/b".try_into()?,
                "a/c".try_into()?,
                "a/d/e".try_into()?,
                "a/f/g".try_into()?,
                "a/f/h".try_into()?
            ]
        );
        assert_eq!(
            store.list_prefix(&"i/".try_into()?)?,
            &["i/j/k".try_into()?]
        );
        assert!(store.list_prefix(&"notfound/".try_into()?)?.is_empty());
        Ok(())
    }

    pub fn store_delete<T: ReadableWritableListableStorageTraits>(
        store: &T,
    ) -> Result<(), Box<dyn Error>> {
        // nested under a value
        delete(store, &"a/b/c".try_into()?)?;
        store.erase(&"a/b/c".try_into()?)?;
        store.erase_prefix(&"a/b/c/".try_into()?)?;
        assert!(store.list_prefix(&"a/b/".try_into()?)?.is_empty());
        assert_eq!(
            store.get(&"a/b".try_into()?)?,
            Some(vec![0, 1, 2, 3].into())
        );

        delete(store, &"a/f".try_into()?)?;
        assert!(store.get(&"a/f/g".try_into()?)?.is_none());
        assert!(store.list_prefix(&"a/f/".try_into()?)?.is_empty());

        delete(store, &"a/c".try_into()?)?;
        assert!(!store.exists(&"a/c".try_into()?)?);

        delete(store, &"never/existed".try_into()?)?;

        assert_eq!(
            store.list()?,
            &["a/b".try_into()?, "a/d/e".try_into()?, "i/j/k".try_into()?]
        );

        delete(store, &"a".try_into()?)?;
        delete(store, &"i".try_into()?)?;
        assert!(store.list()?.is_empty());
        Ok(())
    }
}

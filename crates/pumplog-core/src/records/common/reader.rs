use crate::records::error::RecordError;

pub(crate) struct RecordReader<'a> {
    data: &'a [u8],
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn require_len(&self, needed: usize) -> Result<(), RecordError> {
        if self.data.len() < needed {
            return Err(RecordError::TooShort {
                needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn read_u8(&self, offset: usize) -> Result<u8, RecordError> {
        self.data
            .get(offset)
            .copied()
            .ok_or(RecordError::TooShort {
                needed: offset + 1,
                actual: self.data.len(),
            })
    }

    pub(crate) fn read_pair(&self, offset: usize) -> Result<[u8; 2], RecordError> {
        let bytes = self.read_slice(offset..offset + 2)?;
        Ok([bytes[0], bytes[1]])
    }

    pub(crate) fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], RecordError> {
        self.data.get(range.clone()).ok_or(RecordError::TooShort {
            needed: range.end,
            actual: self.data.len(),
        })
    }
}

//! Producer-side batch client.
//!
//! Drives the staged upload protocol over a request connection: open a
//! batch run, upload chunks, then merge or discard it. Each call is a
//! strict request/response exchange; anything else on the wire is a
//! protocol violation.

use crate::error::ClientError;
use pricecast_core::{
    CancelBatchRequest, CompleteBatchRequest, Message, PriceRecord, PriceUpdate,
    StartBatchRequest, Status, UploadChunkRequest,
};
use pricecast_transport::RequestConnection;

/// Producer-side handle for staged batch uploads.
pub struct BatchClient<C> {
    conn: C,
}

impl<C> BatchClient<C>
where
    C: RequestConnection,
{
    /// Wraps a request connection.
    #[must_use]
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Opens a batch run.
    ///
    /// # Returns
    /// The server-assigned batch id.
    ///
    /// # Errors
    /// [`ClientError::Rejected`] when the server is at its batch limit.
    pub async fn start(&mut self) -> Result<u64, ClientError> {
        let mut buf = [0u8; StartBatchRequest::FRAME_LENGTH];
        StartBatchRequest.encode(&mut buf)?;

        match self.round_trip(&buf).await? {
            Message::StartBatchAck(response) => match response.status {
                Status::Ok => Ok(response.batch_id),
                status => Err(ClientError::Rejected { status }),
            },
            other => Err(unexpected(&other)),
        }
    }

    /// Uploads one chunk of records into an open batch run.
    ///
    /// # Errors
    /// [`ClientError::Rejected`] when the chunk is oversized or the batch
    /// run is unknown.
    pub async fn upload(
        &mut self,
        batch_id: u64,
        records: &[PriceRecord],
    ) -> Result<(), ClientError> {
        let request = UploadChunkRequest {
            batch_id,
            records: records.to_vec(),
        };
        let mut buf = vec![0u8; request.frame_length()];
        request.encode(&mut buf)?;

        match self.round_trip(&buf).await? {
            Message::UploadChunkAck(response) => match response.status {
                Status::Ok => Ok(()),
                status => Err(ClientError::Rejected { status }),
            },
            other => Err(unexpected(&other)),
        }
    }

    /// Uploads a record set in chunks of at most `chunk_size`.
    ///
    /// # Errors
    /// Fails on the first rejected chunk; earlier chunks stay staged.
    pub async fn upload_all(
        &mut self,
        batch_id: u64,
        records: &[PriceRecord],
        chunk_size: usize,
    ) -> Result<(), ClientError> {
        for chunk in records.chunks(chunk_size.max(1)) {
            self.upload(batch_id, chunk).await?;
        }
        Ok(())
    }

    /// Merges a batch run into the live store.
    ///
    /// # Errors
    /// [`ClientError::Rejected`] when the batch run is unknown.
    pub async fn complete(&mut self, batch_id: u64) -> Result<(), ClientError> {
        let mut buf = [0u8; CompleteBatchRequest::FRAME_LENGTH];
        CompleteBatchRequest { batch_id }.encode(&mut buf)?;

        match self.round_trip(&buf).await? {
            Message::CompleteBatchAck(response) => match response.status {
                Status::Ok => Ok(()),
                status => Err(ClientError::Rejected { status }),
            },
            other => Err(unexpected(&other)),
        }
    }

    /// Discards a batch run. Cancelling an already-gone run succeeds.
    pub async fn cancel(&mut self, batch_id: u64) -> Result<(), ClientError> {
        let mut buf = [0u8; CancelBatchRequest::FRAME_LENGTH];
        CancelBatchRequest { batch_id }.encode(&mut buf)?;

        match self.round_trip(&buf).await? {
            Message::CancelBatchAck(response) => match response.status {
                Status::Ok => Ok(()),
                status => Err(ClientError::Rejected { status }),
            },
            other => Err(unexpected(&other)),
        }
    }

    /// Publishes a single fresh update, fire and forget. The server stamps
    /// the sequence, so the record's own sequence must be zero.
    pub async fn publish(&mut self, record: PriceRecord) -> Result<(), ClientError> {
        let mut buf = [0u8; PriceUpdate::FRAME_LENGTH];
        PriceUpdate { record }.encode(&mut buf)?;
        self.conn.send(&buf).await?;
        Ok(())
    }

    async fn round_trip(&mut self, frame: &[u8]) -> Result<Message, ClientError> {
        self.conn.send(frame).await?;
        match self.conn.recv().await? {
            Some(response) => Ok(Message::decode(&response[..])?),
            None => Err(ClientError::Closed),
        }
    }
}

fn unexpected(message: &Message) -> ClientError {
    ClientError::protocol(format!(
        "unexpected response message type {}",
        message.message_type()
    ))
}

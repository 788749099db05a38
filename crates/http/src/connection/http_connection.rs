use bytes::{Bytes, BytesMut};
use http::{Method, StatusCode, Version};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, trace, warn};

use crate::codec::{RequestDecoder, ResponseDecoder};
use crate::config::ConnectionConfig;
use crate::connection::message_reader::MessageReader;
use crate::connection::message_writer::MessageWriter;
use crate::headers::{ConnectionOptions, Field, Headers};
use crate::protocol::{
    status_forbids_body, Body, HttpError, Message, ParseError, PayloadItem, PayloadSize, Request, RequestHead, Response,
    ResponseHead, SendError,
};

const CONNECTION: &str = "connection";
const CONTENT_LENGTH: &str = "content-length";
const TRANSFER_ENCODING: &str = "transfer-encoding";
const HOST: &str = "host";
const EXPECT: &str = "expect";

/// Where a [`Connection`] stands in the current exchange.
///
/// A server walks `Idle → ReadingStartLine → ReadingHeaders → ReadingBody →
/// Responding → Writing`, a client `Idle → Writing → AwaitingResponse →
/// ReadingStartLine → ReadingHeaders → ReadingBody`. A completed exchange
/// returns to `Idle` when the connection persists and ends in `Closed`
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    ReadingStartLine,
    ReadingHeaders,
    ReadingBody,
    /// A request was read, its response is not written yet.
    Responding,
    Writing,
    /// A request was written, its final response is not read yet.
    AwaitingResponse,
    Closed,
}

impl ConnectionState {
    /// States only seen while an operation is running. Finding one on entry
    /// means the previous operation was cancelled halfway.
    fn is_transient(self) -> bool {
        matches!(
            self,
            ConnectionState::ReadingStartLine
                | ConnectionState::ReadingHeaders
                | ConnectionState::ReadingBody
                | ConnectionState::Writing
        )
    }
}

/// An HTTP/1.x connection over a reader and a writer.
///
/// The same type serves both sides: a server calls
/// [`read_request`](Connection::read_request) then
/// [`write_response`](Connection::write_response), a client
/// [`write_request`](Connection::write_request) then
/// [`read_response`](Connection::read_response). One exchange runs at a time
/// and bodies are transferred whole.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct Connection<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
    request_decoder: RequestDecoder,
    response_decoder: ResponseDecoder,
    config: ConnectionConfig,
    state: ConnectionState,
    persistent: bool,
    version: Version,
    request_method: Method,
}

impl<S> Connection<ReadHalf<S>, WriteHalf<S>>
where
    S: AsyncRead + AsyncWrite,
{
    /// Splits a duplex stream into the two halves of a connection.
    pub fn from_stream(io: S) -> Self {
        let (reader, writer) = tokio::io::split(io);
        Self::new(reader, writer)
    }
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        Self {
            reader: MessageReader::with_capacity(reader, config.get_read_buffer_size()),
            writer: MessageWriter::with_capacity(writer, config.get_write_buffer_size()),
            request_decoder: RequestDecoder::new(config),
            response_decoder: ResponseDecoder::new(config),
            config,
            state: ConnectionState::Idle,
            persistent: true,
            version: Version::HTTP_11,
            request_method: Method::GET,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the current exchange leaves the connection reusable.
    pub fn persistent(&self) -> bool {
        self.persistent
    }

    /// The protocol version of the request in the current exchange.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Reads the next request and its whole body.
    ///
    /// Returns `Ok(None)` when the peer closed the connection between two
    /// requests; the connection is then `Closed`. A request carrying
    /// `expect: 100-continue` gets an interim `100 Continue` response before
    /// its body is read.
    pub async fn read_request(&mut self) -> Result<Option<Request>, HttpError> {
        self.enter(ConnectionState::Idle)?;

        match self.do_read_request().await {
            Ok(Some(request)) => {
                self.state = ConnectionState::Responding;
                Ok(Some(request))
            }
            Ok(None) => {
                info!("cant read more request, break this connection down");
                self.shutdown().await;
                Ok(None)
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn do_read_request(&mut self) -> Result<Option<Request>, HttpError> {
        self.state = ConnectionState::ReadingStartLine;
        let Some((mut head, payload_size)) = read_head(&mut self.reader, &mut self.request_decoder, &mut self.state).await?
        else {
            return Ok(None);
        };

        self.version = head.version();
        self.request_method = head.method().clone();
        self.persistent = is_persistent(head.version(), head.headers());
        debug!(
            method = %head.method(),
            target = head.target(),
            version = ?head.version(),
            persistent = self.persistent,
            "receive request head"
        );

        if expects_continue(&head, payload_size) {
            self.send_continue().await?;
        }

        let body = read_body(&mut self.reader, &mut self.request_decoder, head.headers_mut()).await?;
        Ok(Some(Request::new(head, body)))
    }

    async fn send_continue(&mut self) -> Result<(), SendError> {
        let head = ResponseHead::new(Version::HTTP_11, StatusCode::CONTINUE, "", Headers::new());
        self.writer.write_response(Message::<_, Bytes>::Header((head, PayloadSize::Empty)))?;
        self.writer.write_response(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof))?;
        self.writer.flush().await?;
        info!("receive expect request header, sent continue response");
        Ok(())
    }

    /// Writes the response to the request read last.
    ///
    /// Interim 1xx responses keep the exchange open for the final one. The
    /// framing follows the headers when they declare one, otherwise the body:
    /// a full body gets a `content-length`, a fragmented body is chunked on
    /// HTTP/1.1 and close-delimited on HTTP/1.0. A `connection` header is
    /// added when the persistence differs from the version's default.
    pub async fn write_response(
        &mut self,
        version: Version,
        status: StatusCode,
        reason: &str,
        headers: Headers,
        body: impl Into<Body>,
    ) -> Result<(), HttpError> {
        self.enter(ConnectionState::Responding)?;
        self.state = ConnectionState::Writing;

        match self.do_write_response(version, status, reason, headers, body.into()).await {
            Ok(()) if status == StatusCode::SWITCHING_PROTOCOLS => {
                debug!("switching protocols, the connection leaves http");
                self.state = ConnectionState::Closed;
                Ok(())
            }
            Ok(()) if status.is_informational() => {
                self.state = ConnectionState::Responding;
                Ok(())
            }
            Ok(()) => {
                self.finish_exchange().await;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn do_write_response(
        &mut self,
        version: Version,
        status: StatusCode,
        reason: &str,
        headers: Headers,
        body: Body,
    ) -> Result<(), HttpError> {
        let mut headers = writable(headers);
        let payload_size = self.response_payload_size(&mut headers, &body, version, status)?;

        if !status.is_informational() {
            let options = connection_options(&headers);
            self.persistent = self.persistent && !options.is_close() && !payload_size.is_until_close();

            if !self.persistent && !options.is_close() {
                headers.add_to_header(CONNECTION, ConnectionOptions::CLOSE)?;
            } else if self.persistent && version == Version::HTTP_10 && !options.is_keep_alive() {
                headers.add_to_header(CONNECTION, ConnectionOptions::KEEP_ALIVE)?;
            }
        }

        debug!(%status, ?payload_size, persistent = self.persistent, "send response");
        let trailers = chunked_trailers(&headers, payload_size);
        let body = if payload_size.is_empty() { Body::Empty } else { body };

        let head = ResponseHead::new(version, status, reason, headers);
        self.writer.write_response(Message::<_, Bytes>::Header((head, payload_size)))?;
        write_payload(&mut self.writer, MessageWriter::write_response, body, trailers, self.config.get_write_buffer_size())
            .await?;
        Ok(())
    }

    fn response_payload_size(
        &self,
        headers: &mut Headers,
        body: &Body,
        version: Version,
        status: StatusCode,
    ) -> Result<PayloadSize, SendError> {
        let tunnel = self.request_method == Method::CONNECT && status.is_success();
        if status_forbids_body(status) || tunnel {
            if !body.is_empty() {
                error!(%status, "response can't carry a body");
                return Err(SendError::invalid_body(format!("{status} response can't carry a body")));
            }
            return Ok(PayloadSize::Empty);
        }

        if self.request_method == Method::HEAD {
            // announce the size a GET would have received
            if !body.is_empty() && !headers.contains(CONTENT_LENGTH) && !headers.contains(TRANSFER_ENCODING) {
                headers.add_to_header(CONTENT_LENGTH, body.len().to_string())?;
            }
            return Ok(PayloadSize::Empty);
        }

        let chunking = version == Version::HTTP_11 && self.version == Version::HTTP_11;
        if headers.contains(TRANSFER_ENCODING) || headers.contains(CONTENT_LENGTH) {
            let declared = PayloadSize::for_response(headers, status, &self.request_method, false)
                .map_err(|e| SendError::invalid_body(format!("declared framing: {e}")))?;
            if declared.is_chunked() && !chunking {
                debug!(version = ?self.version, "peer can't read chunked bodies, delimit by close");
                return Ok(PayloadSize::UntilClose);
            }
            return Ok(declared);
        }

        Ok(match body {
            Body::Empty => PayloadSize::Length(0),
            Body::Full(_) if chunking && headers.has_trailer() => PayloadSize::Chunked,
            Body::Full(bytes) => PayloadSize::Length(bytes.len() as u64),
            Body::Chunks(_) if chunking => PayloadSize::Chunked,
            Body::Chunks(_) => PayloadSize::UntilClose,
        })
    }

    /// Writes a request and its whole body.
    ///
    /// A `host` field carrying `authority` is added when the headers have
    /// none. The framing rules match [`write_response`](Connection::write_response),
    /// except that a fragmented body on HTTP/1.0 is sent with a
    /// `content-length`.
    pub async fn write_request(
        &mut self,
        authority: &str,
        method: Method,
        target: &str,
        version: Version,
        headers: Headers,
        body: impl Into<Body>,
    ) -> Result<(), HttpError> {
        self.enter(ConnectionState::Idle)?;
        self.state = ConnectionState::Writing;

        match self.do_write_request(authority, method, target, version, headers, body.into()).await {
            Ok(()) => {
                self.state = ConnectionState::AwaitingResponse;
                Ok(())
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn do_write_request(
        &mut self,
        authority: &str,
        method: Method,
        target: &str,
        version: Version,
        headers: Headers,
        body: Body,
    ) -> Result<(), HttpError> {
        let mut headers = writable(headers);
        if !authority.is_empty() && !headers.contains(HOST) {
            headers.add_to_header(HOST, authority)?;
        }

        let payload_size = request_payload_size(&headers, &body, version)?;
        self.version = version;
        self.request_method = method.clone();
        self.persistent = is_persistent(version, &headers);
        debug!(%method, target, ?payload_size, persistent = self.persistent, "send request");

        let trailers = chunked_trailers(&headers, payload_size);
        let mut head = RequestHead::new(method, target, version, headers);
        if !authority.is_empty() {
            head = head.with_authority(authority);
        }

        self.writer.write_request(Message::<_, Bytes>::Header((head, payload_size)))?;
        write_payload(&mut self.writer, MessageWriter::write_request, body, trailers, self.config.get_write_buffer_size())
            .await?;
        Ok(())
    }

    /// Reads the response to the request written last.
    ///
    /// `request_method` decides whether the response can have a body, e.g. a
    /// response to `HEAD` never has one. An interim 1xx response is returned
    /// as is and the connection keeps waiting for the final response.
    pub async fn read_response(&mut self, request_method: &Method) -> Result<Response, HttpError> {
        self.enter(ConnectionState::AwaitingResponse)?;

        match self.do_read_response(request_method).await {
            Ok((response, _)) if response.status() == StatusCode::SWITCHING_PROTOCOLS => {
                debug!("switching protocols, the connection leaves http");
                self.state = ConnectionState::Closed;
                Ok(response)
            }
            Ok((response, _)) if response.head().is_informational() => {
                self.state = ConnectionState::AwaitingResponse;
                Ok(response)
            }
            Ok((response, payload_size)) => {
                self.persistent = self.persistent
                    && is_persistent(response.version(), response.headers())
                    && !payload_size.is_until_close();
                self.finish_exchange().await;
                Ok(response)
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn do_read_response(&mut self, request_method: &Method) -> Result<(Response, PayloadSize), HttpError> {
        self.state = ConnectionState::ReadingStartLine;
        self.response_decoder.set_request_method(request_method.clone());

        let Some((mut head, payload_size)) =
            read_head(&mut self.reader, &mut self.response_decoder, &mut self.state).await?
        else {
            return Err(ParseError::IncompleteHead.into());
        };
        debug!(status = %head.status(), version = ?head.version(), ?payload_size, "receive response head");

        let body = read_body(&mut self.reader, &mut self.response_decoder, head.headers_mut()).await?;
        Ok((Response::new(head, body), payload_size))
    }

    /// Shuts the writer down; the connection can't be used afterwards.
    pub async fn close(&mut self) -> Result<(), HttpError> {
        if self.state == ConnectionState::Closed {
            return Ok(());
        }
        self.state = ConnectionState::Closed;
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Gives back the transport halves and the bytes read past the last
    /// message, e.g. after a `101 Switching Protocols`.
    pub fn into_parts(self) -> (R, BytesMut, W) {
        let (reader, buffered) = self.reader.into_parts();
        (reader, buffered, self.writer.into_inner())
    }

    fn enter(&mut self, expected: ConnectionState) -> Result<(), HttpError> {
        match self.state {
            state if state == expected => Ok(()),
            ConnectionState::Closed => Err(HttpError::Closed),
            state if state.is_transient() => {
                warn!(?state, "previous operation was interrupted, close connection");
                self.state = ConnectionState::Closed;
                Err(HttpError::Closed)
            }
            state => {
                error!(?state, ?expected, "operation not allowed in current state");
                Err(HttpError::InvalidState(state))
            }
        }
    }

    async fn finish_exchange(&mut self) {
        if self.persistent {
            trace!("exchange complete, keep connection alive");
            self.state = ConnectionState::Idle;
        } else {
            debug!("exchange complete, connection not persistent");
            self.shutdown().await;
        }
    }

    async fn shutdown(&mut self) {
        self.state = ConnectionState::Closed;
        if let Err(e) = self.writer.shutdown().await {
            warn!(cause = %e, "failed to shutdown writer");
        }
    }

    async fn fail<T>(&mut self, error: HttpError) -> Result<T, HttpError> {
        error!(cause = %error, state = ?self.state, "exchange failed, close connection");
        self.writer.clear_buf();
        self.shutdown().await;
        Err(error)
    }
}

/// Whether a message of `version` with these headers leaves the connection
/// open: HTTP/1.1 unless `connection: close`, HTTP/1.0 only with
/// `connection: keep-alive`.
pub fn is_persistent(version: Version, headers: &Headers) -> bool {
    let options = connection_options(headers);
    match version {
        Version::HTTP_11 => !options.is_close(),
        Version::HTTP_10 => options.is_keep_alive() && !options.is_close(),
        _ => false,
    }
}

fn connection_options(headers: &Headers) -> ConnectionOptions {
    let mut options = ConnectionOptions::default();
    for value in headers.get_all(CONNECTION) {
        options.extend(value);
    }
    options
}

fn request_payload_size(headers: &Headers, body: &Body, version: Version) -> Result<PayloadSize, SendError> {
    let chunking = version == Version::HTTP_11;
    if headers.contains(TRANSFER_ENCODING) || headers.contains(CONTENT_LENGTH) {
        let declared = PayloadSize::for_request(headers, false)
            .map_err(|e| SendError::invalid_body(format!("declared framing: {e}")))?;
        if declared.is_chunked() && !chunking {
            return Ok(PayloadSize::Length(body.len() as u64));
        }
        return Ok(declared);
    }

    Ok(match body {
        Body::Empty => PayloadSize::Empty,
        Body::Full(_) if chunking && headers.has_trailer() => PayloadSize::Chunked,
        Body::Full(bytes) => PayloadSize::Length(bytes.len() as u64),
        Body::Chunks(_) if chunking => PayloadSize::Chunked,
        Body::Chunks(_) => PayloadSize::Length(body.len() as u64),
    })
}

fn chunked_trailers(headers: &Headers, payload_size: PayloadSize) -> Vec<Field> {
    if payload_size.is_chunked() {
        headers.trailer().cloned().collect()
    } else {
        Vec::new()
    }
}

fn writable(headers: Headers) -> Headers {
    if headers.is_frozen() {
        headers.duplicate()
    } else {
        headers
    }
}

fn expects_continue(head: &RequestHead, payload_size: PayloadSize) -> bool {
    head.version() == Version::HTTP_11
        && !matches!(payload_size, PayloadSize::Empty | PayloadSize::Length(0))
        && head.headers().get_all(EXPECT).any(|value| value.trim().eq_ignore_ascii_case("100-continue"))
}

async fn read_head<R, D, T>(
    reader: &mut MessageReader<R>,
    decoder: &mut D,
    state: &mut ConnectionState,
) -> Result<Option<(T, PayloadSize)>, ParseError>
where
    R: AsyncRead + Unpin,
    D: Decoder<Item = Message<(T, PayloadSize)>, Error = ParseError>,
{
    loop {
        match reader.decode(decoder)? {
            Some(Message::Header(head)) => {
                *state = ConnectionState::ReadingBody;
                return Ok(Some(head));
            }
            Some(Message::Payload(_)) => {
                error!("expect message head but receive payload item");
                return Err(ParseError::malformed_start_line("payload item before message head"));
            }
            None if reader.is_eof() => return Ok(None),
            None => {
                if *state == ConnectionState::ReadingStartLine && reader.has_line() {
                    *state = ConnectionState::ReadingHeaders;
                }
                reader.fill().await?;
            }
        }
    }
}

/// Drains the body of the current message; trailers land in `headers` behind
/// the trailer boundary.
async fn read_body<R, D, T>(reader: &mut MessageReader<R>, decoder: &mut D, headers: &mut Headers) -> Result<Body, ParseError>
where
    R: AsyncRead + Unpin,
    D: Decoder<Item = Message<(T, PayloadSize)>, Error = ParseError>,
{
    let mut chunks = Vec::new();
    loop {
        match reader.next(decoder).await? {
            Some(Message::Payload(PayloadItem::Chunk(bytes))) => chunks.push(bytes),
            Some(Message::Payload(PayloadItem::Trailers(fields))) => {
                let _ = headers.begin_trailer()?;
                for field in fields {
                    let (name, value) = field.into_parts();
                    headers.add(name, value)?;
                }
            }
            Some(Message::Payload(PayloadItem::Eof)) => break,
            Some(Message::Header(_)) => {
                error!("expect payload item but receive message head");
                return Err(ParseError::truncated_body("message head before the end of the body"));
            }
            None => return Err(ParseError::truncated_body("connection closed before the end of the body")),
        }
    }

    let body = match chunks.len() {
        0 => Body::Empty,
        1 => chunks.pop().map_or(Body::Empty, Body::Full),
        _ => Body::Full(Body::Chunks(chunks).into_bytes()),
    };
    trace!(body_size = body.len(), "read body");
    Ok(body)
}

type WritePayload<W, T> = fn(&mut MessageWriter<W>, Message<(T, PayloadSize)>) -> Result<(), SendError>;

async fn write_payload<W, T>(
    writer: &mut MessageWriter<W>,
    write: WritePayload<W, T>,
    body: Body,
    trailers: Vec<Field>,
    flush_threshold: usize,
) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    for chunk in body.into_chunks() {
        write(writer, Message::Payload(PayloadItem::Chunk(chunk)))?;
        if writer.buffered() >= flush_threshold {
            writer.flush().await?;
        }
    }

    if !trailers.is_empty() {
        write(writer, Message::Payload(PayloadItem::Trailers(trailers)))?;
    }
    write(writer, Message::Payload(PayloadItem::Eof))?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn server(wire: &'static [u8]) -> Connection<&'static [u8], Vec<u8>> {
        Connection::new(wire, Vec::new())
    }

    fn written<R>(connection: Connection<R, Vec<u8>>) -> String
    where
        R: AsyncRead + Unpin,
    {
        let (_, _, writer) = connection.into_parts();
        String::from_utf8(writer).unwrap()
    }

    #[tokio::test]
    async fn request_without_body() {
        let mut connection = server(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n");

        let request = connection.read_request().await.unwrap().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.target(), "/index.html");
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.authority(), Some("example.com"));
        assert_eq!(request.body(), &Body::Empty);
        assert!(connection.persistent());
        assert_eq!(connection.state(), ConnectionState::Responding);

        connection.write_response(Version::HTTP_11, StatusCode::OK, "", Headers::new(), "hello").await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Idle);

        assert!(connection.read_request().await.unwrap().is_none());
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert_eq!(written(connection), "HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello");
    }

    #[tokio::test]
    async fn request_with_fixed_body() {
        let mut connection =
            server(b"POST /submit HTTP/1.0\r\nHost: example.com\r\nContent-Length: 11\r\n\r\nhello world");

        let request = connection.read_request().await.unwrap().unwrap();
        assert_eq!(request.body(), &Body::Full(Bytes::from_static(b"hello world")));
        assert!(!connection.persistent());

        connection.write_response(Version::HTTP_10, StatusCode::OK, "", Headers::new(), "done").await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(matches!(connection.read_request().await, Err(HttpError::Closed)));

        assert_eq!(written(connection), "HTTP/1.0 200 OK\r\nconnection: close\r\ncontent-length: 4\r\n\r\ndone");
    }

    #[tokio::test]
    async fn request_with_chunked_body() {
        let mut connection = server(concat!(
            "POST /upload HTTP/1.1\r\n",
            "Host: example.com\r\n",
            "Transfer-Encoding: chunked\r\n",
            "\r\n",
            "4\r\nWiki\r\n",
            "5\r\npedia\r\n",
            "E\r\n in\r\n\r\nchunks.\r\n",
            "0\r\n",
            "\r\n",
        ).as_bytes());

        let request = connection.read_request().await.unwrap().unwrap();
        assert_eq!(request.body(), &Body::Full(Bytes::from_static(b"Wikipedia in\r\n\r\nchunks.")));
        assert!(!request.headers().has_trailer());
        assert_eq!(connection.state(), ConnectionState::Responding);
    }

    #[tokio::test]
    async fn request_trailers_are_captured() {
        let mut connection = server(
            b"POST /upload HTTP/1.1\r\nTrailer: X-Checksum\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\nX-Checksum: 900150983cd2\r\n\r\n",
        );

        let request = connection.read_request().await.unwrap().unwrap();
        let trailer: Vec<_> = request.headers().trailer().cloned().collect();
        assert_eq!(trailer, vec![Field::new("X-Checksum", "900150983cd2")]);
        assert_eq!(request.headers().header_fields().len(), 2);
    }

    #[tokio::test]
    async fn chunked_round_trip_with_trailers() {
        let (client_io, server_io) = duplex(64 * 1024);
        let mut client = Connection::from_stream(client_io);
        let mut server = Connection::from_stream(server_io);

        let mut headers = Headers::from_fields([("Content-Type", "text/plain")]).unwrap();
        let _ = headers.begin_trailer().unwrap();
        headers.add("X-Checksum", "abc").unwrap();
        let body = Body::from(vec![Bytes::from_static(b"Wiki"), Bytes::from_static(b"pedia")]);
        client.write_request("example.com", Method::POST, "/upload", Version::HTTP_11, headers, body).await.unwrap();
        assert_eq!(client.state(), ConnectionState::AwaitingResponse);

        let request = server.read_request().await.unwrap().unwrap();
        assert_eq!(request.authority(), Some("example.com"));
        assert_eq!(request.body(), &Body::Full(Bytes::from_static(b"Wikipedia")));
        assert_eq!(request.headers().get_all("trailer").collect::<Vec<_>>(), vec!["X-Checksum"]);
        assert_eq!(request.headers().trailer().map(Field::value).collect::<Vec<_>>(), vec!["abc"]);

        let body = Body::from(vec![Bytes::from_static(b"in "), Bytes::new(), Bytes::from_static(b"chunks")]);
        server.write_response(Version::HTTP_11, StatusCode::CREATED, "", Headers::new(), body).await.unwrap();
        assert_eq!(server.state(), ConnectionState::Idle);

        let response = client.read_response(&Method::POST).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.reason(), "Created");
        assert_eq!(response.body(), &Body::Full(Bytes::from_static(b"in chunks")));
        assert!(!response.headers().has_trailer());
        assert_eq!(client.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn empty_chunked_body_round_trip() {
        let (client_io, server_io) = duplex(1024);
        let mut client = Connection::from_stream(client_io);
        let mut server = Connection::from_stream(server_io);

        let headers = Headers::from_fields([("Transfer-Encoding", "chunked")]).unwrap();
        client.write_request("example.com", Method::POST, "/", Version::HTTP_11, headers, Body::Empty).await.unwrap();

        let request = server.read_request().await.unwrap().unwrap();
        assert_eq!(request.body(), &Body::Empty);
        assert!(request.headers().contains("transfer-encoding"));
    }

    #[tokio::test]
    async fn close_delimited_round_trip() {
        let (client_io, server_io) = duplex(64 * 1024);
        let mut client = Connection::from_stream(client_io);
        let mut server = Connection::from_stream(server_io);

        client.write_request("example.com", Method::GET, "/", Version::HTTP_10, Headers::new(), Body::Empty).await.unwrap();
        assert!(!client.persistent());

        let request = server.read_request().await.unwrap().unwrap();
        assert_eq!(request.version(), Version::HTTP_10);

        let body = Body::from(vec![Bytes::from_static(b"Wiki"), Bytes::from_static(b"pedia")]);
        server.write_response(Version::HTTP_10, StatusCode::OK, "", Headers::new(), body).await.unwrap();
        assert_eq!(server.state(), ConnectionState::Closed);

        let response = client.read_response(&Method::GET).await.unwrap();
        assert_eq!(response.body(), &Body::Full(Bytes::from_static(b"Wikipedia")));
        assert_eq!(response.headers().get_all("connection").collect::<Vec<_>>(), vec!["close"]);
        assert!(!response.headers().contains("content-length"));
        assert_eq!(client.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn keep_alive_on_http_10() {
        let mut connection = server(b"GET / HTTP/1.0\r\nConnection: Keep-Alive\r\n\r\n");

        connection.read_request().await.unwrap().unwrap();
        assert!(connection.persistent());

        connection.write_response(Version::HTTP_10, StatusCode::OK, "", Headers::new(), Body::Empty).await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Idle);
        assert!(connection.read_request().await.unwrap().is_none());

        assert_eq!(written(connection), "HTTP/1.0 200 OK\r\nconnection: keep-alive\r\ncontent-length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn declared_chunked_to_http_10_peer() {
        let mut connection = server(b"GET / HTTP/1.0\r\n\r\n");
        connection.read_request().await.unwrap().unwrap();

        let headers = Headers::from_fields([("Transfer-Encoding", "chunked")]).unwrap();
        let body = Body::from(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")]);
        connection.write_response(Version::HTTP_11, StatusCode::OK, "", headers, body).await.unwrap();
        assert_eq!(connection.state(), ConnectionState::Closed);

        assert_eq!(written(connection), "HTTP/1.1 200 OK\r\nconnection: close\r\n\r\nabcd");
    }

    #[tokio::test]
    async fn declared_chunked_request_on_http_10() {
        let mut connection = Connection::new(&b""[..], Vec::new());

        let headers = Headers::from_fields([("Transfer-Encoding", "chunked")]).unwrap();
        let body = Body::from(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")]);
        connection.write_request("example.com", Method::POST, "/upload", Version::HTTP_10, headers, body).await.unwrap();

        assert_eq!(written(connection), "POST /upload HTTP/1.0\r\nhost: example.com\r\ncontent-length: 4\r\n\r\nabcd");
    }

    #[tokio::test]
    async fn response_connection_close_ends_exchange() {
        let mut connection = server(b"GET / HTTP/1.1\r\n\r\nGET /next HTTP/1.1\r\n\r\n");

        connection.read_request().await.unwrap().unwrap();
        let headers = Headers::from_fields([("Connection", "close")]).unwrap();
        connection.write_response(Version::HTTP_11, StatusCode::OK, "", headers, Body::Empty).await.unwrap();

        assert!(!connection.persistent());
        assert!(matches!(connection.read_request().await, Err(HttpError::Closed)));
        assert_eq!(written(connection), "HTTP/1.1 200 OK\r\nConnection: close\r\ncontent-length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn head_response_has_no_body() {
        let mut connection = server(b"HEAD / HTTP/1.1\r\n\r\n");

        connection.read_request().await.unwrap().unwrap();
        connection.write_response(Version::HTTP_11, StatusCode::OK, "", Headers::new(), "hello").await.unwrap();

        assert_eq!(connection.state(), ConnectionState::Idle);
        connection.close().await.unwrap();
        assert_eq!(written(connection), "HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\n");
    }

    #[tokio::test]
    async fn bodyless_status_rejects_body() {
        let mut connection = server(b"GET / HTTP/1.1\r\n\r\n");

        connection.read_request().await.unwrap().unwrap();
        let result = connection.write_response(Version::HTTP_11, StatusCode::NO_CONTENT, "", Headers::new(), "x").await;

        assert!(matches!(result, Err(HttpError::WriteError { source: SendError::InvalidBody { .. } })));
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn expect_continue() {
        let mut connection = server(b"PUT /f HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 2\r\n\r\nhi");

        let request = connection.read_request().await.unwrap().unwrap();
        assert_eq!(request.body(), &Body::Full(Bytes::from_static(b"hi")));
        connection.write_response(Version::HTTP_11, StatusCode::NO_CONTENT, "", Headers::new(), Body::Empty).await.unwrap();
        connection.close().await.unwrap();

        assert_eq!(written(connection), "HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 204 No Content\r\n\r\n");
    }

    #[tokio::test]
    async fn interim_response_keeps_waiting() {
        let wire: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok";
        let mut client = Connection::new(wire, Vec::new());

        client.write_request("example.com", Method::GET, "/", Version::HTTP_11, Headers::new(), Body::Empty).await.unwrap();

        let interim = client.read_response(&Method::GET).await.unwrap();
        assert_eq!(interim.status(), StatusCode::CONTINUE);
        assert_eq!(client.state(), ConnectionState::AwaitingResponse);

        let response = client.read_response(&Method::GET).await.unwrap();
        assert_eq!(response.body(), &Body::Full(Bytes::from_static(b"ok")));
        assert_eq!(client.state(), ConnectionState::Idle);

        assert_eq!(written(client), "GET / HTTP/1.1\r\nhost: example.com\r\n\r\n");
    }

    #[tokio::test]
    async fn frozen_headers_are_copied() {
        let wire: &[u8] = b"HTTP/1.1 204 No Content\r\n\r\n";
        let mut client = Connection::new(wire, Vec::new());

        let mut headers = Headers::from_fields([("Accept", "*/*")]).unwrap();
        headers.freeze().unwrap();
        client.write_request("example.com", Method::GET, "/", Version::HTTP_11, headers, Body::Empty).await.unwrap();
        client.read_response(&Method::GET).await.unwrap();

        assert_eq!(written(client), "GET / HTTP/1.1\r\nAccept: */*\r\nhost: example.com\r\n\r\n");
    }

    #[tokio::test]
    async fn state_errors() {
        let mut connection = server(b"GET / HTTP/1.1\r\n\r\n");
        let result = connection.write_response(Version::HTTP_11, StatusCode::OK, "", Headers::new(), Body::Empty).await;
        assert!(matches!(result, Err(HttpError::InvalidState(ConnectionState::Idle))));
        assert!(matches!(connection.read_response(&Method::GET).await, Err(HttpError::InvalidState(ConnectionState::Idle))));

        connection.read_request().await.unwrap().unwrap();
        assert!(matches!(connection.read_request().await, Err(HttpError::InvalidState(ConnectionState::Responding))));
    }

    #[tokio::test]
    async fn malformed_request_closes_connection() {
        let mut connection = server(b"GET / HTTP/1.1\r\nbad header\r\n\r\n");

        let result = connection.read_request().await;
        assert!(matches!(result, Err(HttpError::ReadError { source: ParseError::MalformedHeaderLine { .. } })));
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(matches!(connection.read_request().await, Err(HttpError::Closed)));
    }

    #[tokio::test]
    async fn truncated_body() {
        let mut connection = server(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort");

        let result = connection.read_request().await;
        assert!(matches!(result, Err(HttpError::ReadError { source: ParseError::TruncatedBody { .. } })));
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn persistence_defaults() {
        let none = Headers::new();
        let close = Headers::from_fields([("Connection", "Close")]).unwrap();
        let keep_alive = Headers::from_fields([("connection", "Keep-Alive")]).unwrap();

        assert!(is_persistent(Version::HTTP_11, &none));
        assert!(!is_persistent(Version::HTTP_11, &close));
        assert!(!is_persistent(Version::HTTP_10, &none));
        assert!(is_persistent(Version::HTTP_10, &keep_alive));
        assert!(!is_persistent(Version::HTTP_2, &none));
    }
}

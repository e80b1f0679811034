use crate::RabbitmqConnection;
use amqprs::channel::{ExchangeDeclareArguments, QueueBindArguments, QueueDeclareArguments};

///
/// Declares exchange and queue bound to it using short-lived channel.
///
/// Used for queues that nobody consumes from in this process,
/// e.g. dead letter queues, so messages published to them aren't dropped.
///
#[tracing::instrument(
    name = "RabbitMQ Topology",
    target = "rabbitmq_client::topology",
    skip_all
)]
pub async fn declare_queue(
    rabbitmq_connection: &RabbitmqConnection,
    mut exchange_declare_args: ExchangeDeclareArguments,
    mut queue_declare_args: QueueDeclareArguments,
    queue_bind_args: Vec<QueueBindArguments>,
) -> anyhow::Result<()> {
    let Some(connection) = rabbitmq_connection.connection().borrow().clone() else {
        anyhow::bail!("connection is not available");
    };

    let channel = connection.open_channel(None).await?;

    tracing::info!(exchange = exchange_declare_args.exchange, "declaring exchange");
    exchange_declare_args.no_wait = false;
    channel.exchange_declare(exchange_declare_args).await?;

    tracing::info!("declaring queue");
    queue_declare_args.no_wait(false);
    channel.queue_declare(queue_declare_args).await?;

    for mut queue_bind_args in queue_bind_args {
        tracing::info!(
            queue = queue_bind_args.queue,
            routing_key = queue_bind_args.routing_key,
            "binding queue"
        );
        queue_bind_args.no_wait = false;
        channel.queue_bind(queue_bind_args).await?;
    }

    channel.close().await?;

    Ok(())
}

//! Test fixtures: trimmed SOS 2.0 documents.
//!
//! They keep the real envelope structure (namespaces, nesting, gml ids) of
//! what common SOS 2.0 servers return, cut down to what the decoders read.

/// Capabilities with three offerings on two stations, one of them declared
/// in UTM, plus a full provider contact block.
pub(crate) fn capabilities_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<sos:Capabilities version="2.0.0"
    xmlns:sos="http://www.opengis.net/sos/2.0"
    xmlns:swes="http://www.opengis.net/swes/2.0"
    xmlns:ows="http://www.opengis.net/ows/1.1"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <ows:ServiceIdentification>
    <ows:Title>Coastal monitoring SOS</ows:Title>
    <ows:Abstract>Buoys &amp; tide gauges along the coast</ows:Abstract>
    <ows:ServiceType codeSpace="http://opengeospatial.net">OGC:SOS</ows:ServiceType>
    <ows:ServiceTypeVersion>2.0.0</ows:ServiceTypeVersion>
  </ows:ServiceIdentification>
  <ows:ServiceProvider>
    <ows:ProviderName>Marine Observatory</ows:ProviderName>
    <ows:ProviderSite xlink:href="https://observatory.example.org"/>
    <ows:ServiceContact>
      <ows:IndividualName>Data desk</ows:IndividualName>
      <ows:ContactInfo>
        <ows:Phone>
          <ows:Voice>+33 1 23 45 67 89</ows:Voice>
        </ows:Phone>
        <ows:Address>
          <ows:DeliveryPoint>60 boulevard Saint-Michel</ows:DeliveryPoint>
          <ows:City>Paris</ows:City>
          <ows:AdministrativeArea>Ile-de-France</ows:AdministrativeArea>
          <ows:PostalCode>75006</ows:PostalCode>
          <ows:Country>France</ows:Country>
          <ows:ElectronicMailAddress>data@observatory.example.org</ows:ElectronicMailAddress>
        </ows:Address>
      </ows:ContactInfo>
    </ows:ServiceContact>
  </ows:ServiceProvider>
  <sos:contents>
    <sos:Contents>
      <swes:observableProperty>http://example.org/property/temperature</swes:observableProperty>
      <swes:offering>
        <sos:ObservationOffering>
          <swes:identifier>buoy-1-temperature</swes:identifier>
          <swes:name>Buoy 1 temperature</swes:name>
          <swes:procedure>http://example.org/procedure/buoy-1</swes:procedure>
          <swes:observableProperty>temperature</swes:observableProperty>
          <sos:observedArea>
            <gml:Envelope srsName="http://www.opengis.net/def/crs/EPSG/0/4326">
              <gml:lowerCorner>43.25 5.5</gml:lowerCorner>
              <gml:upperCorner>43.25 5.5</gml:upperCorner>
            </gml:Envelope>
          </sos:observedArea>
          <sos:phenomenonTime>
            <gml:TimePeriod gml:id="tp_1">
              <gml:beginPosition>2020-01-01T00:00:00Z</gml:beginPosition>
              <gml:endPosition>2024-05-01T12:00:00Z</gml:endPosition>
            </gml:TimePeriod>
          </sos:phenomenonTime>
        </sos:ObservationOffering>
      </swes:offering>
      <swes:offering>
        <sos:ObservationOffering>
          <swes:identifier>buoy-1-water</swes:identifier>
          <swes:procedure>http://example.org/procedure/buoy-1</swes:procedure>
          <swes:observableProperty>temperature</swes:observableProperty>
          <swes:observableProperty>salinity</swes:observableProperty>
          <sos:observedArea>
            <gml:Envelope srsName="http://www.opengis.net/def/crs/EPSG/0/4326">
              <gml:lowerCorner>43.25 5.5</gml:lowerCorner>
              <gml:upperCorner>43.25 5.5</gml:upperCorner>
            </gml:Envelope>
          </sos:observedArea>
          <sos:phenomenonTime>
            <gml:TimePeriod gml:id="tp_2">
              <gml:beginPosition>2021-06-01T00:00:00Z</gml:beginPosition>
              <gml:endPosition>2024-05-01T12:00:00Z</gml:endPosition>
            </gml:TimePeriod>
          </sos:phenomenonTime>
        </sos:ObservationOffering>
      </swes:offering>
      <swes:offering>
        <sos:ObservationOffering>
          <swes:identifier>gauge-7-level</swes:identifier>
          <swes:procedure>http://example.org/procedure/gauge-7</swes:procedure>
          <swes:observableProperty>water_level</swes:observableProperty>
          <sos:observedArea>
            <gml:Envelope srsName="urn:ogc:def:crs:EPSG::32631">
              <gml:lowerCorner>448252 5411935</gml:lowerCorner>
              <gml:upperCorner>448252 5411935</gml:upperCorner>
            </gml:Envelope>
          </sos:observedArea>
          <sos:phenomenonTime>
            <gml:TimePeriod gml:id="tp_3">
              <gml:beginPosition>2024-04-30T00:00:00Z</gml:beginPosition>
              <gml:endPosition>2024-05-01T00:00:00Z</gml:endPosition>
            </gml:TimePeriod>
          </sos:phenomenonTime>
        </sos:ObservationOffering>
      </swes:offering>
    </sos:Contents>
  </sos:contents>
</sos:Capabilities>"#
}

/// Capabilities where no offering declares an observed area.
pub(crate) fn capabilities_without_areas_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<sos:Capabilities version="2.0.0"
    xmlns:sos="http://www.opengis.net/sos/2.0"
    xmlns:swes="http://www.opengis.net/swes/2.0"
    xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification>
    <ows:Title>Lab SOS</ows:Title>
  </ows:ServiceIdentification>
  <sos:contents>
    <sos:Contents>
      <swes:offering>
        <sos:ObservationOffering>
          <swes:identifier>lab-a</swes:identifier>
          <swes:observableProperty>humidity</swes:observableProperty>
        </sos:ObservationOffering>
      </swes:offering>
      <swes:offering>
        <sos:ObservationOffering>
          <swes:identifier>lab-b</swes:identifier>
          <swes:observableProperty>pressure</swes:observableProperty>
        </sos:ObservationOffering>
      </swes:offering>
    </sos:Contents>
  </sos:contents>
</sos:Capabilities>"#
}

/// Three measurements; the second one has no result time.
pub(crate) fn observations_with_gap_xml() -> &'static str {
    r##"<?xml version="1.0" encoding="UTF-8"?>
<sos:GetObservationResponse
    xmlns:sos="http://www.opengis.net/sos/2.0"
    xmlns:om="http://www.opengis.net/om/2.0"
    xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <sos:observationData>
    <om:OM_Observation gml:id="o_1">
      <om:type xlink:href="http://www.opengis.net/def/observationType/OGC-OM/2.0/OM_Measurement"/>
      <om:phenomenonTime>
        <gml:TimeInstant gml:id="phenomenonTime_1">
          <gml:timePosition>2024-05-01T10:00:00.000Z</gml:timePosition>
        </gml:TimeInstant>
      </om:phenomenonTime>
      <om:resultTime>
        <gml:TimeInstant gml:id="resultTime_1">
          <gml:timePosition>2024-05-01T10:00:00.000Z</gml:timePosition>
        </gml:TimeInstant>
      </om:resultTime>
      <om:procedure xlink:href="http://example.org/procedure/buoy-1"/>
      <om:observedProperty xlink:href="temperature"/>
      <om:featureOfInterest xlink:href="http://example.org/foi/buoy-1"/>
      <om:result xsi:type="gml:MeasureType" uom="degC">14.2</om:result>
    </om:OM_Observation>
  </sos:observationData>
  <sos:observationData>
    <om:OM_Observation gml:id="o_2">
      <om:phenomenonTime>
        <gml:TimeInstant gml:id="phenomenonTime_2">
          <gml:timePosition>2024-05-01T11:00:00.000Z</gml:timePosition>
        </gml:TimeInstant>
      </om:phenomenonTime>
      <om:procedure xlink:href="http://example.org/procedure/buoy-1"/>
      <om:observedProperty xlink:href="temperature"/>
      <om:result xsi:type="gml:MeasureType" uom="degC">14.6</om:result>
    </om:OM_Observation>
  </sos:observationData>
  <sos:observationData>
    <om:OM_Observation gml:id="o_3">
      <om:phenomenonTime>
        <gml:TimeInstant gml:id="phenomenonTime_3">
          <gml:timePosition>2024-05-01T12:00:00.000Z</gml:timePosition>
        </gml:TimeInstant>
      </om:phenomenonTime>
      <om:resultTime xlink:href="#phenomenonTime_3"/>
      <om:procedure xlink:href="http://example.org/procedure/buoy-1"/>
      <om:observedProperty xlink:href="temperature"/>
      <om:result xsi:type="gml:MeasureType" uom="degC">15.1</om:result>
    </om:OM_Observation>
  </sos:observationData>
</sos:GetObservationResponse>"##
}

/// Measurements whose first observation carries no unit and whose last one
/// has a non-numeric value.
pub(crate) fn observations_mixed_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<sos:GetObservationResponse
    xmlns:sos="http://www.opengis.net/sos/2.0"
    xmlns:om="http://www.opengis.net/om/2.0"
    xmlns:gml="http://www.opengis.net/gml/3.2">
  <sos:observationData>
    <om:OM_Observation gml:id="o_1">
      <om:resultTime>
        <gml:TimeInstant gml:id="rt_1">
          <gml:timePosition>2024-05-01T10:00:00+02:00</gml:timePosition>
        </gml:TimeInstant>
      </om:resultTime>
      <om:result>3.5</om:result>
    </om:OM_Observation>
  </sos:observationData>
  <sos:observationData>
    <om:OM_Observation gml:id="o_2">
      <om:resultTime>
        <gml:TimeInstant gml:id="rt_2">
          <gml:timePosition>2024-05-01T11:00:00+02:00</gml:timePosition>
        </gml:TimeInstant>
      </om:resultTime>
      <om:result uom="m">n/a</om:result>
    </om:OM_Observation>
  </sos:observationData>
</sos:GetObservationResponse>"#
}

pub(crate) fn empty_observations_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<sos:GetObservationResponse xmlns:sos="http://www.opengis.net/sos/2.0"/>"#
}

pub(crate) fn exception_report_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="2.0.0">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="observedProperty">
    <ows:ExceptionText>The value 'wind' of the parameter 'observedProperty' is invalid</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#
}
